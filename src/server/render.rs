//! HTML rendering using minijinja with embedded templates.

use std::io;
use std::path::Path;

use minijinja::{context, Environment, Error as JinjaError, ErrorKind};
use rust_embed::Embed;
use serde::Serialize;

use crate::session::SharedRoot;

/// Embedded HTML templates.
#[derive(Embed)]
#[folder = "templates/"]
pub struct Templates;

/// A template engine for rendering the welcome page and directory listings.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates.
    pub fn new() -> Result<Self, JinjaError> {
        let mut env = Environment::new();

        for file in Templates::iter() {
            let filename = file.to_string();
            if let Some(content) = Templates::get(&filename) {
                let template_str = std::str::from_utf8(content.data.as_ref())
                    .map_err(|_| JinjaError::from(ErrorKind::InvalidOperation))?;
                env.add_template_owned(filename, template_str.to_string())?;
            }
        }

        Ok(Self { env })
    }

    /// Render the welcome page linking to the share listing.
    pub fn render_welcome(&self, token: &str) -> Result<String, JinjaError> {
        let template = self.env.get_template("welcome.html")?;
        template.render(context! { token => urlencoding::encode(token) })
    }

    /// Render the top-level listing of registered roots.
    pub fn render_roots(&self, token: &str, roots: &[SharedRoot]) -> Result<String, JinjaError> {
        let template = self.env.get_template("roots.html")?;
        let view = RootsView::new(token, roots);
        template.render(context! { roots => view.roots })
    }

    /// Render a directory listing page.
    pub fn render_listing(&self, listing: &ListingView) -> Result<String, JinjaError> {
        let template = self.env.get_template("listing.html")?;
        template.render(context! {
            index_path => listing.index_path,
            parent_href => listing.parent_href,
            entries => listing.entries,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new().expect("failed to initialize template engine")
    }
}

/// A single link in a listing page.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub name: String,
    pub href: String,
    pub is_dir: bool,
}

/// View model for the top-level roots listing.
#[derive(Debug, Clone, Serialize)]
pub struct RootsView {
    pub roots: Vec<EntryView>,
}

impl RootsView {
    fn new(token: &str, roots: &[SharedRoot]) -> Self {
        let roots = roots
            .iter()
            .map(|root| EntryView {
                name: root.name().to_string(),
                href: href_for(token, root.name(), root.is_dir()),
                is_dir: root.is_dir(),
            })
            .collect();
        Self { roots }
    }
}

/// View model for a directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    /// Displayed heading, e.g. `/{token}/share/sub/`.
    pub index_path: String,
    /// Link back to the parent directory (the roots listing at the top).
    pub parent_href: String,
    /// Direct children, sorted by name.
    pub entries: Vec<EntryView>,
}

impl ListingView {
    /// Build a listing view by reading the directory at `dir`.
    ///
    /// `logical` is the normalized request path (e.g. `share/sub`) used to
    /// rebuild each child's link.
    pub fn from_dir(token: &str, logical: &str, dir: &Path) -> io::Result<Self> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.path().is_dir();
            let child_logical = format!("{logical}/{name}");
            entries.push(EntryView {
                href: href_for(token, &child_logical, is_dir),
                name,
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let parent_href = match logical.rsplit_once('/') {
            Some((parent, _)) => href_for(token, parent, true),
            None => format!("/{}/", urlencoding::encode(token)),
        };

        Ok(Self {
            index_path: format!("/{token}/{logical}/"),
            parent_href,
            entries,
        })
    }
}

/// Build a link for a logical path, percent-encoding each segment.
///
/// Directory links carry a trailing slash so browsers resolve relative
/// navigation consistently.
pub fn href_for(token: &str, logical: &str, trailing_slash: bool) -> String {
    let encoded = encode_path(logical);
    let slash = if trailing_slash { "/" } else { "" };
    format!("/{}/{}{}", urlencoding::encode(token), encoded, slash)
}

/// Percent-encode a logical path segment by segment, preserving separators.
pub fn encode_path(logical: &str) -> String {
    logical
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::register_paths;
    use tempfile::TempDir;

    #[test]
    fn test_encode_path_preserves_separators() {
        assert_eq!(encode_path("share/sub/a.txt"), "share/sub/a.txt");
        assert_eq!(encode_path("share/my file.txt"), "share/my%20file.txt");
        assert_eq!(encode_path("share/100%.txt"), "share/100%25.txt");
    }

    #[test]
    fn test_href_for_directory_gets_trailing_slash() {
        assert_eq!(href_for("tok", "share/sub", true), "/tok/share/sub/");
        assert_eq!(href_for("tok", "share/a.txt", false), "/tok/share/a.txt");
    }

    #[test]
    fn test_listing_view_sorted_with_parent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = ListingView::from_dir("tok", "share", dir.path()).unwrap();

        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert_eq!(listing.parent_href, "/tok/");
        assert_eq!(listing.entries[2].href, "/tok/share/sub/");
        assert!(listing.entries[2].is_dir);
    }

    #[test]
    fn test_listing_view_nested_parent() {
        let dir = TempDir::new().unwrap();
        let listing = ListingView::from_dir("tok", "share/sub", dir.path()).unwrap();
        assert_eq!(listing.parent_href, "/tok/share/");
    }

    #[test]
    fn test_render_roots_contains_links() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("share")).unwrap();
        let roots = register_paths(&[dir.path().join("share")]);

        let engine = TemplateEngine::default();
        let html = engine.render_roots("tok", &roots).unwrap();

        assert!(html.contains("Shared Directories"));
        assert!(html.contains("href=\"/tok/share/\""));
        assert!(html.contains("share/"));
    }

    #[test]
    fn test_render_welcome_links_to_token() {
        let engine = TemplateEngine::default();
        let html = engine.render_welcome("abc123").unwrap();
        assert!(html.contains("href=\"/abc123/\""));
    }
}
