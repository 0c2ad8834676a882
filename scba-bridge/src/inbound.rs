//! Reader for frames sent by the host runtime.
//!
//! Event frames are forwarded to the event dispatcher; acknowledgement
//! frames complete pending transmissions on the [`StdioHost`]. Malformed
//! lines are logged and skipped.

use crate::host::{AckOutcome, StdioHost};
use scba_core::events::{HostEvent, HostEventSender};
use scba_sdk::objects::InboundFrame;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Read frames from `reader` until EOF or shutdown.
///
/// Transmissions still waiting for an acknowledgement are left alone; the
/// caller fails them once the events already queued have been handled.
pub async fn run_inbound<R, W>(
    reader: R,
    host: &StdioHost<W>,
    event_tx: HostEventSender,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("Inbound reader received shutdown signal");
                    return Ok(());
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!(pending = host.pending_count(), "Host input closed");
                    return Ok(());
                };
                handle_line(&line, host, &event_tx).await;
            }
        }
    }
}

async fn handle_line<W>(line: &str, host: &StdioHost<W>, event_tx: &HostEventSender)
where
    W: AsyncWrite + Unpin + Send,
{
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let frame: InboundFrame = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed frame");
            return;
        }
    };

    match frame {
        InboundFrame::Ack { transaction_id } => {
            debug!(transaction_id, "Message acknowledged");
            host.resolve(transaction_id, AckOutcome::Ack);
        }
        InboundFrame::Nack {
            transaction_id,
            error,
        } => {
            debug!(transaction_id, error = ?error, "Message rejected");
            host.resolve(transaction_id, AckOutcome::Nack(error));
        }
        frame => {
            let Some(event) = HostEvent::from_frame(frame) else {
                return;
            };
            if let Err(e) = event_tx.send(event).await {
                warn!(event = %e.0.kind(), "HostEvent channel closed, dropping event");
            }
        }
    }
}
