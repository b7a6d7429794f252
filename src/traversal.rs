/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Walks a path from a starting node, acquiring locks along the way under a
//! caller-chosen policy, and hands back the target node plus the stack of
//! locks passed through so the caller can release them in reverse order.
//!
//! Grounded on `examples/original_source/Tree.c`'s `access_dir`/`exit_monitors`
//! pair, including its three `entry_fn` policies (`edit_entry`, `list_entry`,
//! `chill_entry`). The C original threads `Tree*` pointers through a fixed
//! `Monitor* passedby[MAX_PATH_LEN / 2]` array; this crate threads raw
//! `*const Node` pointers through a growable [`LockStack`] instead (the
//! "Open question: lock-stack sizing" from the spec, resolved as a `Vec` --
//! see `DESIGN.md`).
//!
//! # Why raw pointers
//!
//! Every node is owned exclusively by its parent's `children` map behind a
//! `Box`, so a node's address is stable for as long as it is reachable.
//! `access` never holds a Rust borrow across the loop -- holding `&Node` for
//! an ancestor while also producing a child reference to hand back to the
//! operation layer (which needs to *mutate* the child's parent, i.e. an
//! ancestor already visited) does not type-check under the borrow checker,
//! the same way the C original has no aliasing rules to satisfy either. The
//! actual exclusivity guarantee comes from the rendezvous lock protocol, not
//! from the type system: a writer-locked node is, by the locking discipline
//! in `tree::ops`, observed by no other thread, so forming a `&mut Node` from
//! the raw pointer while holding that lock is sound. This mirrors the
//! `Tree*`-passing of `examples/original_source/Tree.c` directly rather than
//! attempting a safe-Rust encoding (e.g. per-node `Mutex<HashMap<..>>` behind
//! `Arc`), which cannot express the LCA double-access protocol's "traverse
//! without locking, because the writer lock already held upstream excludes
//! everyone else" step (spec.md's §4.5 move operation, §9's final Design
//! Note).

use crate::node::Node;
use crate::path;
use crate::sync::RendezvousLock;

/// The ordered sequence of ancestor locks a traversal acquired, to be
/// released in reverse (LIFO) order by [`release_stack`].
///
/// Does not include the lock on the traversal's final/target node -- the
/// caller holds that one directly and releases it according to the policy
/// it chose (see module docs and spec.md §4.4).
#[derive(Default)]
pub struct LockStack(Vec<*const RendezvousLock>);

impl LockStack {
    pub fn new() -> Self {
        LockStack(Vec::new())
    }

    fn push(&mut self, lock: *const RendezvousLock) {
        self.0.push(lock);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An entry policy applied at each node a traversal visits, as `access_dir`'s
/// `entry_fn` parameter in the C original.
pub trait EntryPolicy {
    /// Called on every node the traversal passes through, including the
    /// final/target node (`is_final = true` on that one call only).
    fn enter(&self, lock: &RendezvousLock, is_final: bool);

    /// Called by [`release_stack`] to release a lock this policy acquired on
    /// an intermediate (non-final) node.
    fn exit_intermediate(&self, lock: &RendezvousLock);
}

/// Reader-acquire on every node visited, final or not. Used by `list`.
pub struct ListPolicy;

impl EntryPolicy for ListPolicy {
    fn enter(&self, lock: &RendezvousLock, _is_final: bool) {
        lock.acquire_reader();
    }

    fn exit_intermediate(&self, lock: &RendezvousLock) {
        lock.release_reader();
    }
}

/// Reader-acquire on intermediate nodes, writer-acquire on the final node.
/// Used by `create`, `remove`, and the LCA access of `move_dir`.
pub struct EditPolicy;

impl EntryPolicy for EditPolicy {
    fn enter(&self, lock: &RendezvousLock, is_final: bool) {
        if is_final {
            lock.acquire_writer();
        } else {
            lock.acquire_reader();
        }
    }

    fn exit_intermediate(&self, lock: &RendezvousLock) {
        lock.release_reader();
    }
}

/// No-op on every node. Used after the LCA is already writer-held, to reach
/// `source_parent`/`target_parent` in `move_dir` without contending for any
/// further locks -- see the module docs' "why raw pointers" section and
/// spec.md's §9 note on this policy.
pub struct ChillPolicy;

impl EntryPolicy for ChillPolicy {
    fn enter(&self, _lock: &RendezvousLock, _is_final: bool) {}

    fn exit_intermediate(&self, _lock: &RendezvousLock) {}
}

/// Walks `path` from `root` under `policy`, returning the target node (or a
/// null pointer if some intermediate component was missing) plus the stack
/// of ancestor locks acquired along the way.
///
/// # Safety
///
/// `root` must point to a live `Node` that outlives the locks taken on it
/// and on its descendants; the caller must release the returned target lock
/// and the returned stack (via [`release_stack`]) before `root` (or the
/// subtree under it) can be freed.
pub unsafe fn access<P: EntryPolicy>(
    root: *const Node,
    path: &str,
    policy: &P,
) -> (*const Node, LockStack) {
    let mut stack = LockStack::new();
    let mut current = root;
    let mut rest = path;

    while let Some((component, tail)) = path::split_head(rest) {
        if current.is_null() {
            return (std::ptr::null(), stack);
        }
        let node = unsafe { &*current };
        policy.enter(&node.lock, false);
        stack.push(&node.lock as *const RendezvousLock);
        current = node
            .children
            .get(component)
            .map(|child| child.as_ref() as *const Node)
            .unwrap_or(std::ptr::null());
        rest = tail;
    }

    if !current.is_null() {
        let node = unsafe { &*current };
        policy.enter(&node.lock, true);
    }

    (current, stack)
}

/// Releases every lock in `stack`, in reverse (LIFO) acquisition order,
/// using `policy`'s intermediate-release rule.
///
/// # Safety
///
/// Every pointer in `stack` must still point to a live lock.
pub unsafe fn release_stack<P: EntryPolicy>(mut stack: LockStack, policy: &P) {
    while let Some(lock) = stack.0.pop() {
        let lock = unsafe { &*lock };
        policy.exit_intermediate(lock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn sample_tree() -> Node {
        let mut root = Node::new("/");
        let mut a = Node::new("a");
        a.children.insert("b".into(), Box::new(Node::new("b")));
        root.children.insert("a".into(), Box::new(a));
        root
    }

    #[test]
    fn access_root_yields_empty_stack() {
        let root = sample_tree();
        let (target, stack) = unsafe { access(&root as *const Node, "/", &ListPolicy) };
        assert_eq!(&root as *const Node, target);
        assert!(stack.is_empty());
        unsafe { (&*target).lock.release_reader() };
    }

    #[test]
    fn access_descends_and_builds_stack() {
        let root = sample_tree();
        let (target, stack) = unsafe { access(&root as *const Node, "/a/b/", &ListPolicy) };
        assert!(!target.is_null());
        assert_eq!("b", unsafe { &*target }.name);
        assert!(!stack.is_empty());
        unsafe { (&*target).lock.release_reader() };
        unsafe { release_stack(stack, &ListPolicy) };
    }

    #[test]
    fn access_missing_component_yields_null_target_with_partial_stack() {
        let root = sample_tree();
        let (target, stack) = unsafe { access(&root as *const Node, "/missing/x/", &ListPolicy) };
        assert!(target.is_null());
        assert!(!stack.is_empty());
        unsafe { release_stack(stack, &ListPolicy) };
    }

    #[test]
    fn edit_policy_writer_locks_only_final_node() {
        let root = sample_tree();
        let (target, stack) = unsafe { access(&root as *const Node, "/a/", &EditPolicy) };
        assert!(!target.is_null());
        unsafe { (&*target).lock.release_writer() };
        unsafe { release_stack(stack, &EditPolicy) };
    }
}
