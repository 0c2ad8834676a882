//! Listener registration and event dispatch.

use super::channels::HostEventReceiver;
use super::types::{HostEvent, HostEventKind};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Error returned by a failing listener. The dispatcher only logs it.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// A callback invoked for every event of the kind it was registered for.
///
/// Listeners run on the dispatcher loop and must not block; long-running
/// work is spawned.
pub type Listener = Box<dyn Fn(HostEvent) -> Result<(), ListenerError> + Send + Sync>;

/// Something listeners can be registered on.
pub trait HostEvents {
    /// Register `listener` for events of `kind`.
    fn add_event_listener(&mut self, kind: HostEventKind, listener: Listener);
}

/// Fans host events out to registered listeners.
///
/// Listeners for the same kind are invoked in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(HostEventKind, Listener)>,
}

impl HostEvents for EventDispatcher {
    fn add_event_listener(&mut self, kind: HostEventKind, listener: Listener) {
        debug!(event = %kind, "Registered event listener");
        self.listeners.push((kind, listener));
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.listeners.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Invoke every listener registered for the event's kind.
    ///
    /// Returns the number of listeners invoked. A failing listener is
    /// logged and does not prevent the others from running.
    pub fn dispatch(&self, event: HostEvent) -> usize {
        let kind = event.kind();
        let mut invoked = 0;

        for (_, listener) in self.listeners.iter().filter(|(k, _)| *k == kind) {
            invoked += 1;
            if let Err(e) = listener(event.clone()) {
                error!(event = %kind, error = %e, "Event listener failed");
            }
        }

        if invoked == 0 {
            debug!(event = %kind, "No listener registered for event");
        }
        invoked
    }

    /// Dispatch events from `event_rx` until shutdown is signaled or every
    /// sender is dropped.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, mut event_rx: HostEventReceiver) {
        info!("EventDispatcher started");

        loop {
            tokio::select! {
                biased;

                // A dropped shutdown sender counts as a shutdown signal.
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("EventDispatcher received shutdown signal");
                        break;
                    }
                }

                event = event_rx.recv() => {
                    let Some(event) = event else {
                        info!("HostEvent channel closed");
                        break;
                    };
                    debug!(event = %event.kind(), "Received HostEvent");
                    self.dispatch(event);
                }
            }
        }

        info!("EventDispatcher shutdown complete");
    }
}
