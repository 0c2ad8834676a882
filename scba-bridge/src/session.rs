//! A bridge session: reads host frames until EOF or shutdown, then winds
//! down in order.
//!
//! 1. The inbound reader stops and drops the event sender.
//! 2. The dispatcher handles every event still queued, then exits.
//! 3. Transmissions waiting for an acknowledgement are failed.
//! 4. Host calls spawned by the relay are given `drain_timeout` to finish
//!    writing their frames.

use crate::host::StdioHost;
use crate::inbound::run_inbound;
use scba_core::ConfigRelay;
use scba_core::events::{EventDispatcher, host_event_channel};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Run one session over `reader` with `relay` registered on a fresh
/// dispatcher.
///
/// # Arguments
///
/// * `reader` - Source of inbound frames (stdin in production)
/// * `host` - Host adapter the relay sends through
/// * `relay` - The configuration relay
/// * `shutdown_rx` - Shutdown signal
/// * `drain_timeout` - Upper bound on waiting for spawned host calls
pub async fn run_session<R, W>(
    reader: R,
    host: Arc<StdioHost<W>>,
    relay: Arc<ConfigRelay<StdioHost<W>>>,
    shutdown_rx: watch::Receiver<bool>,
    drain_timeout: Duration,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut dispatcher = EventDispatcher::new();
    Arc::clone(&relay).register(&mut dispatcher);

    let (event_tx, event_rx) = host_event_channel();
    let dispatcher_handle = tokio::spawn(dispatcher.run(shutdown_rx.clone(), event_rx));

    let result = run_inbound(reader, &host, event_tx, shutdown_rx).await;

    if let Err(e) = dispatcher_handle.await {
        error!(error = %e, "EventDispatcher task failed");
    }

    let failed = host.fail_pending();
    if failed > 0 {
        warn!(failed, "Host input closed with unacknowledged messages");
    }

    match tokio::time::timeout(drain_timeout, relay.drain()).await {
        Ok(()) => info!("All host calls finished"),
        Err(_) => warn!(
            in_flight = relay.in_flight(),
            "Gave up waiting for host calls"
        ),
    }

    result
}
