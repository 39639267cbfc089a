//! peershare: ad-hoc file sharing over HTTP on a local network.
//!
//! A set of local paths is registered at startup and exposed behind a
//! randomly generated (or user-chosen) URL token. Requests are resolved
//! statelessly against that immutable session: the resolver maps a logical
//! URL path back to a sandboxed filesystem path, and the server renders
//! directory listings or streams file contents.

pub mod config;
pub mod logging;
pub mod resolver;
pub mod server;
pub mod session;

pub use resolver::{is_descendant, resolve, ResolveError, ResolvedPath};
pub use session::{ShareSession, SharedRoot};
