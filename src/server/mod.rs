//! Web server exposing the share session over HTTP.

pub mod render;
pub mod routes;

pub use render::TemplateEngine;
pub use routes::{build_router, AppState};

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::session::ShareSession;

/// Best-effort discovery of the LAN-facing local IP address.
///
/// Connecting a UDP socket never sends a packet; it only asks the OS which
/// local address would be used to route toward the target. Falls back to
/// loopback when the machine has no route out.
pub fn local_ip() -> IpAddr {
    let fallback = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let Ok(socket) = UdpSocket::bind(("0.0.0.0", 0)) else {
        return fallback;
    };
    if socket.connect(("8.8.8.8", 80)).is_err() {
        return fallback;
    }
    socket.local_addr().map(|addr| addr.ip()).unwrap_or(fallback)
}

/// Run the web server for the given session.
///
/// Binds on all interfaces so peers on the local network can reach the
/// share, logs the access URL, and serves until Ctrl+C (or SIGTERM).
pub async fn run_server(session: ShareSession) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], session.port()));
    let access_url = format!(
        "http://{}:{}/{}/",
        local_ip(),
        session.port(),
        session.token()
    );

    let state = Arc::new(AppState {
        session,
        templates: TemplateEngine::default(),
    });

    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;

    info!(url = %access_url, "files available");
    println!("Files available at: {access_url}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Wait for the shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ip_returns_some_address() {
        // Either a routable address or the loopback fallback; never panics.
        let ip = local_ip();
        assert!(!ip.is_unspecified());
    }
}
