/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The crate's error enum -- one POSIX-equivalent variant per spec.md §6.
//!
//! Grounded on `diffuzzer::abstract_fs::fs::FsError`: a single
//! `#[derive(Error)]` enum carrying the offending path where useful, with a
//! `type Result<T> = std::result::Result<T, TreeError>` alias mirroring
//! `diffuzzer`'s own `type Result<T> = std::result::Result<T, FsError>`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TreeError {
    #[error("invalid path '{0}'")]
    InvalidArgument(String),
    #[error("no directory at path '{0}'")]
    NotFound(String),
    #[error("directory at path '{0}' already exists")]
    AlreadyExists(String),
    #[error("directory at path '{0}' is not empty")]
    NotEmpty(String),
    #[error("operation on '{0}' is not permitted")]
    Busy(String),
    #[error("out of memory while creating '{0}'")]
    OutOfMemory(String),
    #[error("cannot move '{0}' into its own descendant '{1}'")]
    MoveIntoOwnDescendant(String, String),
}
