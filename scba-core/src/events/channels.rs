//! Host event channel factory and handles.

use super::types::HostEvent;
use tokio::sync::mpsc;

/// Default buffer size for the host event channel.
///
/// Host events are user-driven and rare; a small buffer is plenty.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Sender handle for HostEvent events.
pub type HostEventSender = mpsc::Sender<HostEvent>;
/// Receiver handle for HostEvent events.
pub type HostEventReceiver = mpsc::Receiver<HostEvent>;

/// Create a new HostEvent channel.
///
/// Returns a (sender, receiver) pair. Multiple senders can be cloned from
/// the returned sender.
pub fn host_event_channel() -> (HostEventSender, HostEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
