//! Maps logical request paths back to validated filesystem paths.
//!
//! Every resolution goes through `fs::canonicalize`, so the sandbox check in
//! [`is_descendant`] always compares symlink-resolved absolute paths. A path
//! that tries to escape its root (via `..` sequences or symlinks) and a path
//! that simply does not exist both resolve to the same not-found outcome.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::session::SharedRoot;

/// Errors that can occur when resolving a request path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No registered root's base name matches the leading path segment.
    #[error("no shared root matches: {0}")]
    UnknownRoot(String),

    /// The path does not exist, or its canonical form escapes the root.
    #[error("path not found or outside the shared root: {0}")]
    NotFound(String),

    /// An unexpected I/O failure during canonicalization.
    #[error("failed to resolve {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A successfully resolved request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Canonical absolute path on disk, guaranteed inside its root.
    pub abs: PathBuf,
    /// Normalized logical path (no leading/trailing slashes), suitable for
    /// rebuilding listing links.
    pub logical: String,
}

/// Resolve a URL-decoded request path against the registered roots.
///
/// The leading segment must equal some root's base name; the remainder is
/// joined onto that root's path and canonicalized. Resolution fails if the
/// canonical result is not a descendant of the root (root-equals-path is
/// allowed) or if nothing exists at that path.
pub fn resolve(roots: &[SharedRoot], request_path: &str) -> Result<ResolvedPath, ResolveError> {
    let logical = request_path.trim_matches('/');

    for root in roots {
        let Some(remainder) = strip_root_name(logical, root.name()) else {
            continue;
        };

        let candidate = if remainder.is_empty() {
            root.path().to_path_buf()
        } else {
            root.path().join(remainder)
        };

        let abs = match fs::canonicalize(&candidate) {
            Ok(abs) => abs,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ResolveError::NotFound(logical.to_string()));
            }
            Err(source) => {
                return Err(ResolveError::Io {
                    path: candidate,
                    source,
                });
            }
        };

        if !is_descendant(&abs, root.path()) {
            return Err(ResolveError::NotFound(logical.to_string()));
        }

        return Ok(ResolvedPath {
            abs,
            logical: logical.to_string(),
        });
    }

    Err(ResolveError::UnknownRoot(logical.to_string()))
}

/// Whether `candidate` lies under `root` (or equals it).
///
/// Both arguments must already be canonical. The comparison is component-wise,
/// so `/tmp/sharedir` is not a descendant of `/tmp/share` and trailing
/// separators are irrelevant.
pub fn is_descendant(candidate: &Path, root: &Path) -> bool {
    candidate.starts_with(root)
}

/// Strip a root's base name off the front of a normalized logical path.
///
/// Returns the remainder without its leading slashes, `Some("")` when the
/// path addresses the root itself, or `None` when the leading segment is a
/// different name (`sharedir` must not match root `share`).
fn strip_root_name<'a>(logical: &'a str, name: &str) -> Option<&'a str> {
    let rest = logical.strip_prefix(name)?;
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with('/') {
        Some(rest.trim_start_matches('/'))
    } else {
        None
    }
}
