//! HTTP routes for the sharing server.
//!
//! Every route is a plain GET; resolution failures surface as a generic 404
//! so the response never leaks which part of the lookup failed.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::render::{ListingView, TemplateEngine};
use crate::resolver::{resolve, ResolveError};
use crate::session::ShareSession;

/// Shared application state.
pub struct AppState {
    pub session: ShareSession,
    pub templates: TemplateEngine,
}

/// Build the router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome_handler))
        .route("/favicon.ico", get(favicon_handler))
        .route("/:token", get(roots_handler))
        .route("/:token/", get(roots_handler))
        .route("/:token/*path", get(serve_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for the static welcome page.
async fn welcome_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.templates.render_welcome(state.session.token()) {
        Ok(html) => Html(html).into_response(),
        Err(e) => template_error(e),
    }
}

/// Browsers request this aggressively; answer without a body.
async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Handler for `/{token}/`: lists the registered roots by base name.
async fn roots_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    if token != state.session.token() {
        warn!(%token, "request with unknown token");
        return not_found();
    }

    match state
        .templates
        .render_roots(state.session.token(), state.session.roots())
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => template_error(e),
    }
}

/// Handler for `/{token}/{path...}`: directory listing or file stream.
///
/// The path parameter arrives percent-decoded (exactly once) from the
/// extractor, matching the encoding applied when listing links are built.
async fn serve_handler(
    State(state): State<Arc<AppState>>,
    Path((token, path)): Path<(String, String)>,
) -> Response {
    if token != state.session.token() {
        warn!(%token, "request with unknown token");
        return not_found();
    }

    let resolved = match resolve(state.session.roots(), &path) {
        Ok(resolved) => resolved,
        Err(ResolveError::Io { path, source }) => {
            error!(path = %path.display(), %source, "i/o error during resolution");
            return server_error();
        }
        Err(e) => {
            warn!(%path, %e, "access denied or path not found");
            return not_found();
        }
    };

    if resolved.abs.is_dir() {
        let listing =
            match ListingView::from_dir(state.session.token(), &resolved.logical, &resolved.abs) {
                Ok(listing) => listing,
                Err(e) => {
                    error!(path = %resolved.abs.display(), %e, "failed to read directory");
                    return server_error();
                }
            };
        match state.templates.render_listing(&listing) {
            Ok(html) => Html(html).into_response(),
            Err(e) => template_error(e),
        }
    } else {
        info!(path = %resolved.abs.display(), "serving file");
        stream_file(&resolved.abs).await
    }
}

/// Stream a file as an octet-stream download named after its base name.
async fn stream_file(abs: &std::path::Path) -> Response {
    let file = match tokio::fs::File::open(abs).await {
        Ok(file) => file,
        Err(e) => {
            error!(path = %abs.display(), %e, "failed to open file");
            return server_error();
        }
    };

    let filename = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(body)
        .unwrap_or_else(|_| server_error())
}

/// Generic 404 that does not reveal why the lookup failed.
fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File or directory not found").into_response()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

fn template_error(e: minijinja::Error) -> Response {
    error!(%e, "template rendering failed");
    server_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    use crate::session::ShareSession;

    fn test_state(share_dir: &std::path::Path) -> Arc<AppState> {
        let session =
            ShareSession::new(&[share_dir.to_path_buf()], 6688, Some("tok".to_string()), 6)
                .unwrap();
        Arc::new(AppState {
            session,
            templates: TemplateEngine::default(),
        })
    }

    fn share_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let share = dir.path().join("share");
        std::fs::create_dir(&share).unwrap();
        std::fs::write(share.join("a.txt"), b"alpha").unwrap();
        dir
    }

    async fn get_response(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_welcome_links_to_share() {
        let dir = share_fixture();
        let app = build_router(test_state(&dir.path().join("share")));

        let response = get_response(app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("/tok/"));
    }

    #[tokio::test]
    async fn test_favicon_no_content() {
        let dir = share_fixture();
        let app = build_router(test_state(&dir.path().join("share")));
        let response = get_response(app, "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_wrong_token_is_not_found() {
        let dir = share_fixture();
        let state = test_state(&dir.path().join("share"));

        let response = get_response(build_router(state.clone()), "/other/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get_response(build_router(state), "/other/share/a.txt").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_roots_listing_with_and_without_trailing_slash() {
        let dir = share_fixture();
        let state = test_state(&dir.path().join("share"));

        for uri in ["/tok", "/tok/"] {
            let response = get_response(build_router(state.clone()), uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert!(String::from_utf8_lossy(&body).contains("share"));
        }
    }

    #[tokio::test]
    async fn test_file_download_headers_and_bytes() {
        let dir = share_fixture();
        let app = build_router(test_state(&dir.path().join("share")));

        let response = get_response(app, "/tok/share/a.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("a.txt"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"alpha");
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let dir = share_fixture();
        let app = build_router(test_state(&dir.path().join("share")));

        let response = get_response(app, "/tok/share/../../etc/passwd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
