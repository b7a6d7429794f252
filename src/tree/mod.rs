/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The tree facade: construction, the public operation surface, and
//! iterative teardown.
//!
//! Grounded on `examples/original_source/Tree.c`'s `tree_new`/`tree_free`
//! pair (§4.6 of the spec). The actual operation bodies live in [`ops`]; this
//! module only owns the root and dispatches.

pub mod ops;

use crate::error::Result;
use crate::node::Node;

/// A thread-safe, in-memory hierarchical directory tree.
///
/// Share across threads behind an `Arc<Tree>`: every operation takes `&self`
/// and relies entirely on the per-node [`crate::sync::RendezvousLock`]s for
/// mutual exclusion, the same way `examples/original_source/Tree.c` passes a
/// bare `Tree*` to every worker thread.
pub struct Tree {
    root: Box<Node>,
}

impl Tree {
    /// Allocates a fresh tree containing only the root directory `/`.
    pub fn new() -> Self {
        Tree {
            root: Box::new(Node::new("/")),
        }
    }

    pub(crate) fn root_ptr(&self) -> *const Node {
        self.root.as_ref() as *const Node
    }

    /// Returns the sorted, comma-joined names of `path`'s immediate
    /// children, or `None` if `path` is invalid or does not name an existing
    /// directory.
    pub fn list(&self, path: &str) -> Option<String> {
        ops::list(self, path)
    }

    /// Creates an empty directory at `path`.
    pub fn create(&self, path: &str) -> Result<()> {
        ops::create(self, path)
    }

    /// Removes the empty directory at `path`.
    pub fn remove(&self, path: &str) -> Result<()> {
        ops::remove(self, path)
    }

    /// Moves (and renames) the subtree at `source` to `target`.
    pub fn move_dir(&self, source: &str, target: &str) -> Result<()> {
        ops::move_dir(self, source, target)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tree_has_empty_root() {
        let tree = Tree::new();
        assert_eq!(Some(String::new()), tree.list("/"));
    }
}
