/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The per-node reader/writer synchronization primitive.
//!
//! Readers coexist, at most one writer runs at a time, and the primitive is
//! safe against spurious wakeups through an explicit wake-token handshake:
//! a waiter only leaves its wait loop once it observes (and consumes) a
//! token deposited by whichever release woke it, rather than trusting that
//! every [`Condvar::wait`] return implies its turn has actually come.
//!
//! This mirrors a hand-rolled mutex + two condvar monitor (the shape you'd
//! reach for in C with `pthread_cond_t`), not [`std::sync::RwLock`]: we need
//! the exact writer-preferred wake policy and the ability to enter/exit the
//! lock as two separate steps from two different call sites (the traversal
//! engine acquires on the way down, the operation releases on the way back
//! out), which a `RwLockReadGuard`/`RwLockWriteGuard` pair can't express
//! across that boundary.

use std::sync::{Condvar, Mutex};

use super::fatal;

#[derive(Default)]
struct State {
    readers_waiting: usize,
    writers_waiting: usize,
    readers_active: usize,
    writers_active: usize,
    readers_woken: usize,
    writers_woken: usize,
}

/// A fair(ish), writer-preferring reader/writer lock local to one tree node.
///
/// Guards nothing by itself: callers acquire a mode, then access the node's
/// protected data, then release the same mode. See [`crate::node::Node`] for
/// how the lock and the data it protects are paired.
pub struct RendezvousLock {
    state: Mutex<State>,
    readers: Condvar,
    writers: Condvar,
}

impl RendezvousLock {
    pub fn new() -> Self {
        RendezvousLock {
            state: Mutex::new(State::default()),
            readers: Condvar::new(),
            writers: Condvar::new(),
        }
    }

    /// Blocks until no writer is active or waiting, then joins as a reader.
    pub fn acquire_reader(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| fatal(&e.to_string()));
        while state.writers_waiting > 0 || state.writers_active > 0 {
            state.readers_waiting += 1;
            state = self
                .readers
                .wait(state)
                .unwrap_or_else(|e| fatal(&e.to_string()));
            state.readers_waiting -= 1;
            if state.readers_woken > 0 {
                state.readers_woken -= 1;
                break;
            }
        }
        debug_assert_eq!(state.writers_active, 0);
        state.readers_active += 1;
    }

    /// Releases a reader slot; wakes a waiting writer once the last reader
    /// leaves, otherwise wakes every waiting reader.
    pub fn release_reader(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| fatal(&e.to_string()));
        assert!(state.readers_active > 0, "release_reader: no reader held");
        state.readers_active -= 1;
        // `&& state.readers_woken == 0`: if a broadcast woke several readers,
        // some may reach here before the rest have woken and become active.
        // Without this check one of them could wake a writer while readers
        // from the same broadcast are still on their way in.
        if state.readers_active == 0 && state.writers_waiting > 0 && state.readers_woken == 0 {
            state.writers_woken = 1;
            self.writers.notify_one();
        } else if state.readers_active == 0 {
            state.readers_woken = state.readers_waiting;
            self.readers.notify_all();
        }
    }

    /// Blocks until the lock is completely quiescent, then takes exclusive
    /// access.
    pub fn acquire_writer(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| fatal(&e.to_string()));
        while state.readers_waiting > 0
            || state.readers_active > 0
            || state.writers_active > 0
            || state.writers_waiting > 0
        {
            state.writers_waiting += 1;
            state = self
                .writers
                .wait(state)
                .unwrap_or_else(|e| fatal(&e.to_string()));
            state.writers_waiting -= 1;
            if state.writers_woken > 0 {
                state.writers_woken -= 1;
                break;
            }
        }
        debug_assert_eq!(state.readers_active, 0);
        debug_assert_eq!(state.writers_active, 0);
        state.writers_active = 1;
    }

    /// Releases exclusive access, preferring to wake readers over writers.
    pub fn release_writer(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| fatal(&e.to_string()));
        assert_eq!(state.writers_active, 1, "release_writer: no writer held");
        state.writers_active = 0;
        if state.readers_waiting > 0 {
            state.readers_woken = state.readers_waiting;
            self.readers.notify_all();
        } else if state.writers_waiting > 0 {
            state.writers_woken = 1;
            self.writers.notify_one();
        }
    }
}
