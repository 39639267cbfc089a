use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use peershare::config::Config;
use peershare::logging::{init_logging, LogConfig, Verbosity};
use peershare::server::run_server;
use peershare::session::ShareSession;

#[derive(Parser)]
#[command(name = "peershare")]
#[command(version)]
#[command(about = "Share files and directories over HTTP on your local network")]
#[command(
    long_about = "Ad-hoc P2P file sharing: exposes the given files and directories over plain HTTP behind a random (or custom) URL token, for sharing with peers on the same network."
)]
struct Cli {
    /// Files or directories to share
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Port to serve on (default: 6688)
    #[arg(short, long)]
    port: Option<u16>,

    /// Custom URL path segment instead of a random token
    #[arg(long)]
    url: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write debug logs to a file
    #[arg(long)]
    log_file: Option<String>,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&LogConfig {
        verbosity: cli.verbosity(),
        log_file: cli.log_file.clone(),
    });

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(%e, "failed to load config, using defaults");
        Config::default()
    });

    let port = config.effective_port(cli.port);
    let token_length = config.effective_token_length();

    let session = ShareSession::new(&cli.paths, port, cli.url, token_length)
        .context("nothing to serve")?;

    run_server(session).await
}
