//! SCBA Tracker Configuration Bridge
//!
//! Relays settings from the tracker's hosted configuration form to the
//! watch app. The host runtime talks to this process over stdin/stdout
//! using line-delimited JSON frames; logs go to stderr.

mod config;
mod host;
mod inbound;
mod session;
mod shutdown;

use clap::Parser;
use config::ConfigLoader;
use host::StdioHost;
use scba_core::ConfigRelay;
use session::run_session;
use shutdown::spawn_shutdown_handler;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// SCBA tracker configuration bridge
#[derive(Parser, Debug)]
#[command(name = "scba-bridge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (defaults to ./scba-bridge.toml if present)
    #[arg(short, long, env = "SCBA_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the settings form URL
    #[arg(long, env = "SCBA_FORM_URL")]
    form_url: Option<String>,
}

/// Grace period for background work once the bridge has stopped. The
/// blocking stdin read cannot be cancelled, so the runtime is not waited on
/// indefinitely.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// How long spawned host calls may keep writing once host input has closed.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(args));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load configuration; tracing needs its log filter
    let loaded = ConfigLoader::new(args.config.as_ref(), args.form_url).load();
    init_tracing(loaded.as_ref().ok().and_then(|c| c.log_filter.as_deref()));
    let config = loaded.map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    tracing::info!("Starting scba-bridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(form_url = %config.relay.form_url, "Configuration loaded");

    let host = Arc::new(StdioHost::new(tokio::io::stdout(), config.ack_timeout));
    let relay = Arc::new(ConfigRelay::new(Arc::clone(&host), config.relay));

    let (_shutdown_tx, shutdown_rx) = spawn_shutdown_handler();
    let result = run_session(
        BufReader::new(tokio::io::stdin()),
        host,
        relay,
        shutdown_rx,
        DRAIN_TIMEOUT,
    )
    .await;

    tracing::info!("Bridge shutdown complete");
    result.map_err(Into::into)
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Output goes to stderr
/// because stdout carries protocol frames.
fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("info")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
