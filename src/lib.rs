/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A thread-safe, in-memory hierarchical directory tree with fine-grained,
//! per-node locking.
//!
//! The public surface is [`tree::Tree`] and its four operations (`list`,
//! `create`, `remove`, `move_dir`); everything else is an implementation
//! detail of the concurrency protocol described in `DESIGN.md`.

pub mod config;
pub mod error;
pub mod node;
pub mod path;
pub mod sync;
pub mod traversal;
pub mod tree;

pub use error::{Result, TreeError};
pub use tree::Tree;
