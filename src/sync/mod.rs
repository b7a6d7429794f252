/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Synchronization primitives and the process-wide fatal-error path.

pub mod rendezvous;

pub use rendezvous::RendezvousLock;

/// Logs a diagnostic and aborts the process.
///
/// Grounded on `examples/original_source/err.c`'s `syserr`: locking-primitive
/// corruption (a poisoned mutex, in Rust's case — the moral equivalent of the
/// C original's `pthread_*` failures) means some other thread already
/// panicked while holding state this lock depends on. There is no
/// `Result`-returning recovery that doesn't risk silently corrupting the
/// tree, so, like the C original, we log and exit the process rather than
/// propagate an error.
pub fn fatal(message: &str) -> ! {
    log::error!("fatal: {message}");
    std::process::exit(1)
}
