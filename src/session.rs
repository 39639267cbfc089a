//! Share session state: the access token and the set of shared roots.
//!
//! A [`ShareSession`] is built once at startup and stays immutable for the
//! process lifetime. Request handlers only ever read from it, so it can be
//! shared freely behind an `Arc` without locking.

use std::fs;
use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

/// Default port to serve on.
pub const DEFAULT_PORT: u16 = 6688;

/// Default length of a generated access token.
pub const DEFAULT_TOKEN_LENGTH: usize = 6;

/// Errors that can occur when building a share session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// None of the requested paths exist.
    #[error("no valid files or directories to share")]
    NoSharedPaths,
}

/// A top-level filesystem path exposed by the session.
///
/// The path is canonical (absolute, symlink-resolved); the base name is the
/// leading URL segment clients use to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedRoot {
    path: PathBuf,
    name: String,
}

impl SharedRoot {
    /// The canonical filesystem path of this root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The base name identifying this root in URLs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this root is a directory (as opposed to a single file).
    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }
}

/// Immutable per-process sharing state: token, roots, and port.
#[derive(Debug, Clone)]
pub struct ShareSession {
    token: String,
    roots: Vec<SharedRoot>,
    port: u16,
}

impl ShareSession {
    /// Build a session from the requested paths.
    ///
    /// Non-existent paths are skipped with a warning. Returns
    /// [`SessionError::NoSharedPaths`] if nothing valid remains. When no
    /// custom token is given, a random alphanumeric token of `token_length`
    /// characters is generated.
    pub fn new(
        paths: &[PathBuf],
        port: u16,
        custom_token: Option<String>,
        token_length: usize,
    ) -> Result<Self, SessionError> {
        let roots = register_paths(paths);
        if roots.is_empty() {
            return Err(SessionError::NoSharedPaths);
        }

        let token = custom_token.unwrap_or_else(|| generate_token(token_length));

        Ok(Self { token, roots, port })
    }

    /// The URL path segment gating access to this session.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The registered shared roots.
    pub fn roots(&self) -> &[SharedRoot] {
        &self.roots
    }

    /// The port the session is served on.
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Filter the requested paths down to the ones that exist, in canonical form.
///
/// Paths that do not exist (or cannot be canonicalized) are skipped with a
/// warning rather than aborting the whole session.
pub fn register_paths(paths: &[PathBuf]) -> Vec<SharedRoot> {
    let mut roots = Vec::new();

    for path in paths {
        match fs::canonicalize(path) {
            Ok(abs) => {
                let Some(name) = abs.file_name().and_then(|n| n.to_str()) else {
                    warn!(path = %abs.display(), "shared path has no usable base name, skipping");
                    continue;
                };
                info!(path = %abs.display(), "added to shared paths");
                roots.push(SharedRoot {
                    name: name.to_string(),
                    path: abs,
                });
            }
            Err(_) => {
                warn!(path = %path.display(), "path does not exist and will be skipped");
            }
        }
    }

    roots
}

/// Generate a random alphanumeric access token.
pub fn generate_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
