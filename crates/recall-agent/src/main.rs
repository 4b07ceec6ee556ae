//! # recall-agent
//!
//! Remote playback-control agent binary — attaches to the page holding the
//! playback surface, connects to the controller, and runs until ctrl-c.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use recall_client::{ClientConfig, ConnectionManager};
use recall_surface::{PageSession, PageSurfaceProvider};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Remote playback-control agent.
#[derive(Parser, Debug)]
#[command(name = "recall-agent", about = "Remote playback-control agent")]
struct Cli {
    /// Controller host (`host[:port]`) serving the control channel.
    #[arg(long, default_value = "127.0.0.1:8000")]
    host: String,

    /// Connect with wss:// instead of ws://.
    #[arg(long)]
    secure: bool,

    /// DevTools WebSocket URL of the page holding the playback surface.
    #[arg(long)]
    page_ws_url: Option<String>,

    /// DevTools host for page discovery when --page-ws-url is not set.
    #[arg(long, default_value = "127.0.0.1")]
    devtools_host: String,

    /// DevTools port for page discovery when --page-ws-url is not set.
    #[arg(long, default_value = "9222")]
    devtools_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig {
        host: cli.host,
        secure: cli.secure,
        ..ClientConfig::default()
    };
    config.apply_env_overrides();

    let session = match &cli.page_ws_url {
        Some(url) => PageSession::connect(url)
            .await
            .context("attach to the playback page")?,
        None => PageSession::discover(&cli.devtools_host, cli.devtools_port)
            .await
            .context("discover a debuggable page")?,
    };
    let provider = PageSurfaceProvider::new(session);

    let manager = ConnectionManager::new(config, provider);
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        let _ = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, shutting down");
                cancel.cancel();
            }
        });
    }

    manager.run(cancel).await;
    Ok(())
}
