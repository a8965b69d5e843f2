use std::path::PathBuf;

use anyhow::Context;
use async_std::task;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinyhttpd::config::ServerConfig;
use tinyhttpd::net::{Server, ShutdownHandle};

/// Minimal HTTP/1.1 static file server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (`key=value` lines, or TOML when it ends in `.toml`)
    #[arg(short, long, env = "HTTPD_CONFIG", default_value = "config.ini")]
    config: PathBuf,

    /// Overrides the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::from_file(&cli.config)
        .with_context(|| format!("cannot load configuration from {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::info!(?config, "configuration loaded");

    task::block_on(async {
        let addr = config.socket_addr();
        let server = Server::bind(config)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        let handle = server.shutdown_handle()?;
        install_signal_handlers(handle)?;

        server.run().await;
        Ok::<_, anyhow::Error>(())
    })
}

#[cfg(unix)]
fn install_signal_handlers(handle: ShutdownHandle) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("cannot install signal handlers")?;
    std::thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!(signal, "received signal");
                handle.stop();
            }
        })
        .context("cannot spawn signal thread")?;
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handlers(_handle: ShutdownHandle) -> anyhow::Result<()> {
    tracing::warn!("signal handling is unavailable on this platform, stop the process to exit");
    Ok(())
}
