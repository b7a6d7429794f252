/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Validation and decomposition of tree paths.
//!
//! A path is `/`, or a `/`-terminated sequence of lowercase-ASCII
//! components: `/a/b/c/`. Pure, allocation-only-for-owned-strings, no
//! concurrency — grounded on `diffuzzer`'s `abstract_fs::pathname::PathName`
//! (same newtype-over-`String`, `Display`, `From<&str>`/`From<String>`
//! shape), generalized to this crate's trailing-slash path grammar and
//! extended with the lowest-common-ancestor computation the move operation
//! needs.

pub const MAX_PATH_LEN: usize = 4095;
pub const MAX_NAME_LEN: usize = 255;

/// Returns whether `path` is a well-formed tree path: `/`, or starts and
/// ends with `/` with each `/`-delimited segment 1-255 lowercase ASCII
/// letters, total length at most [`MAX_PATH_LEN`].
pub fn is_valid(path: &str) -> bool {
    if path.is_empty() || path.len() > MAX_PATH_LEN {
        return false;
    }
    let bytes = path.as_bytes();
    if bytes[0] != b'/' || bytes[bytes.len() - 1] != b'/' {
        return false;
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            // Root ("/") splits into ["", ""]; any other empty segment
            // means a "//" somewhere, which is invalid.
            continue;
        }
        if segment.len() > MAX_NAME_LEN {
            return false;
        }
        if !segment.bytes().all(|b| b.is_ascii_lowercase()) {
            return false;
        }
    }
    // path.split('/') on "/" yields ["", ""] — two empty segments and
    // nothing else. On a non-root path there must be at least one
    // non-empty segment between the leading and trailing slash, and no
    // *interior* empty segment (which `split` would report as "//").
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return false;
    }
    segments[1..segments.len() - 1].iter().all(|s| !s.is_empty())
}

/// Splits off the first component of a non-root, valid path.
///
/// Returns `(component, rest)` where `rest` is still `/`-anchored and
/// `/`-terminated. Returns `None` when `path` is `/`.
pub fn split_head(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    let rest_of = &path[1..];
    let slash = rest_of.find('/')?;
    let component = &rest_of[..slash];
    let rest = &rest_of[slash..];
    Some((component, rest))
}

/// Splits a non-root, valid path into its parent path and last component.
///
/// Returns `None` when `path` is `/`.
pub fn parent_and_tail(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    let without_trailing = &path[..path.len() - 1];
    let slash = without_trailing.rfind('/')?;
    let parent = &path[..slash + 1];
    let tail = &without_trailing[slash + 1..];
    Some((parent, tail))
}

/// Returns whether `b` is a strict descendant path of `a`: `b` begins with
/// `a` (component-aligned) and `b != a`.
pub fn is_proper_descendant_path(a: &str, b: &str) -> bool {
    a != b && b.starts_with(a)
}

/// Returns the component-aligned lowest common ancestor of two valid paths,
/// plus the residual tails of each below the LCA (themselves valid paths,
/// `/`-anchored relative to the LCA node).
///
/// Operates on whole path components, not raw byte prefixes: for
/// `p1 = "/a/b/"`, `p2 = "/a/bb/"` the LCA is `/a/`, not `/a/b`. A naive
/// byte-prefix scan (as in `examples/original_source/path_utils.c`'s
/// `path_lca_move`) would stop mid-component and get this wrong; this
/// implementation walks whole `/`-delimited components instead.
pub fn lca<'a>(p1: &'a str, p2: &'a str) -> (String, &'a str, &'a str) {
    let mut lca_path = String::from("/");
    let mut rest1 = &p1[1..];
    let mut rest2 = &p2[1..];

    loop {
        let head1 = rest1.find('/').map(|i| &rest1[..i]);
        let head2 = rest2.find('/').map(|i| &rest2[..i]);
        match (head1, head2) {
            (Some(h1), Some(h2)) if h1 == h2 => {
                lca_path.push_str(h1);
                lca_path.push('/');
                rest1 = &rest1[h1.len() + 1..];
                rest2 = &rest2[h2.len() + 1..];
            }
            _ => break,
        }
    }

    let tail1 = &p1[lca_path.len() - 1..];
    let tail2 = &p2[lca_path.len() - 1..];
    (lca_path, tail1, tail2)
}
