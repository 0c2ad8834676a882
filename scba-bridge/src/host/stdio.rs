//! Host adapter speaking line-delimited JSON.
//!
//! Outbound frames are written to any [`AsyncWrite`] (stdout in
//! production). Acknowledgements come back through the inbound reader,
//! which hands them to [`StdioHost::resolve`].

use async_trait::async_trait;
use scba_core::{Host, HostError, MessageAck};
use scba_sdk::objects::{AppMessage, OutboundFrame};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

/// How the host answered an app message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Ack,
    Nack(Option<String>),
}

/// [`Host`] implementation over a line-delimited JSON stream.
pub struct StdioHost<W> {
    writer: tokio::sync::Mutex<W>,
    pending: Mutex<HashMap<u32, oneshot::Sender<AckOutcome>>>,
    next_transaction: AtomicU32,
    ack_timeout: Duration,
    input_closed: AtomicBool,
}

impl<W: AsyncWrite + Unpin + Send> StdioHost<W> {
    /// Create a new StdioHost writing frames to `writer`.
    pub fn new(writer: W, ack_timeout: Duration) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
            pending: Mutex::new(HashMap::new()),
            next_transaction: AtomicU32::new(1),
            ack_timeout,
            input_closed: AtomicBool::new(false),
        }
    }

    /// Complete the pending transmission `transaction_id`.
    ///
    /// Returns `false` if nothing was waiting for it (already timed out, or
    /// never sent).
    pub fn resolve(&self, transaction_id: u32, outcome: AckOutcome) -> bool {
        let Some(waiter) = self.pending().remove(&transaction_id) else {
            warn!(transaction_id, "Acknowledgement for unknown transaction");
            return false;
        };
        // The sender side may have given up in the meantime.
        waiter.send(outcome).is_ok()
    }

    /// Fail every outstanding transmission with [`HostError::Disconnected`].
    ///
    /// Called once no acknowledgement can arrive any more. Messages sent
    /// afterwards are still written, then fail without waiting.
    ///
    /// Returns the number of transmissions failed.
    pub fn fail_pending(&self) -> usize {
        self.input_closed.store(true, Ordering::SeqCst);
        let mut pending = self.pending();
        let count = pending.len();
        // Dropping the senders wakes the waiters with a receive error.
        pending.clear();
        count
    }

    /// Number of transmissions waiting for an acknowledgement.
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<u32, oneshot::Sender<AckOutcome>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write_frame(&self, frame: &OutboundFrame) -> Result<(), HostError> {
        let mut line = serde_json::to_vec(frame)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Host for StdioHost<W> {
    async fn open_url(&self, url: &Url) -> Result<(), HostError> {
        self.write_frame(&OutboundFrame::OpenUrl { url: url.clone() })
            .await
    }

    async fn send_app_message(&self, message: AppMessage) -> Result<MessageAck, HostError> {
        let transaction_id = self.next_transaction.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(transaction_id, tx);

        let frame = OutboundFrame::AppMessage {
            transaction_id,
            payload: message,
        };
        if let Err(e) = self.write_frame(&frame).await {
            self.pending().remove(&transaction_id);
            return Err(e);
        }
        // Checked after registering, so a concurrent fail_pending either
        // drops our slot or is seen here.
        if self.input_closed.load(Ordering::SeqCst) {
            self.pending().remove(&transaction_id);
            debug!(transaction_id, "App message written after host input closed");
            return Err(HostError::Disconnected);
        }
        debug!(transaction_id, "App message written, waiting for acknowledgement");

        match tokio::time::timeout(self.ack_timeout, rx).await {
            Ok(Ok(AckOutcome::Ack)) => Ok(MessageAck { transaction_id }),
            Ok(Ok(AckOutcome::Nack(reason))) => Err(HostError::Nack {
                transaction_id,
                reason: reason.unwrap_or_else(|| "unspecified".to_string()),
            }),
            Ok(Err(_)) => Err(HostError::Disconnected),
            Err(_) => {
                self.pending().remove(&transaction_id);
                Err(HostError::Timeout { transaction_id })
            }
        }
    }
}
