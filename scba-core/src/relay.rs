//! ConfigRelay.
//!
//! The ConfigRelay is responsible for:
//! - Logging when the host runtime becomes ready
//! - Opening the hosted settings form when the user asks for it
//! - Decoding the form's response when the web view closes, renaming its
//!   fields to storage keys and sending them to the watch
//!
//! Every closed web view produces two transmissions: the settings message
//! followed by an empty message. Both are spawned independently, neither
//! waits for the other, and a failed transmission is only logged.
//!
//! Spawned work is tracked so the owner can wait for it with
//! [`ConfigRelay::drain`] before the runtime goes away.

use crate::config::RelayConfig;
use crate::events::{HostEvent, HostEventKind, HostEvents};
use crate::host::{Host, MessageAck};
use scba_sdk::objects::AppMessage;
use scba_sdk::{PayloadError, decode_webview_response};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use url::Url;

/// Errors that can occur while handling a host event.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The web view response could not be decoded.
    #[error("failed to decode settings payload: {0}")]
    Payload(#[from] PayloadError),
}

/// Outcome of a single transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Acked(MessageAck),
    Failed,
}

/// Handles to the two transmissions issued for a closed web view.
pub struct Transmissions {
    /// The renamed settings.
    pub settings: JoinHandle<Delivery>,
    /// The empty follow-up message.
    pub feedback: JoinHandle<Delivery>,
}

impl Transmissions {
    /// Wait for both transmissions to settle.
    pub async fn join(self) -> (Delivery, Delivery) {
        let (settings, feedback) = tokio::join!(self.settings, self.feedback);
        (
            settings.unwrap_or_else(|e| aborted("settings", e)),
            feedback.unwrap_or_else(|e| aborted("settings feedback", e)),
        )
    }
}

fn aborted(label: &'static str, e: JoinError) -> Delivery {
    warn!(
        transmission = label,
        cancelled = e.is_cancelled(),
        error = %e,
        "Transmission task did not complete"
    );
    Delivery::Failed
}

/// Relays settings from the configuration web view to the watch.
///
/// Keeps nothing from one event to the next apart from the handles of
/// host calls still running.
pub struct ConfigRelay<H> {
    host: Arc<H>,
    config: RelayConfig,
    tasks: TaskTracker,
}

impl<H: Host + 'static> ConfigRelay<H> {
    /// Create a new ConfigRelay.
    ///
    /// # Arguments
    ///
    /// * `host` - Host runtime used to open URLs and send messages
    /// * `config` - Relay configuration
    pub fn new(host: Arc<H>, config: RelayConfig) -> Self {
        Self {
            host,
            config,
            tasks: TaskTracker::new(),
        }
    }

    /// The page opened on a configuration request.
    pub fn form_url(&self) -> &Url {
        &self.config.form_url
    }

    /// Number of spawned host calls that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait until every host call spawned so far has finished.
    ///
    /// Events handled afterwards still spawn work; call this once no more
    /// events can arrive.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Register the relay's listeners for all three host events.
    pub fn register(self: Arc<Self>, events: &mut impl HostEvents) {
        for kind in [
            HostEventKind::Ready,
            HostEventKind::ShowConfiguration,
            HostEventKind::WebviewClosed,
        ] {
            let relay = Arc::clone(&self);
            events.add_event_listener(
                kind,
                Box::new(move |event| relay.handle(event).map_err(Into::into)),
            );
        }
    }

    /// Route a single host event to its handler.
    pub fn handle(&self, event: HostEvent) -> Result<(), RelayError> {
        match event {
            HostEvent::Ready => self.on_ready(),
            HostEvent::ShowConfiguration => {
                self.on_show_configuration();
            }
            HostEvent::WebviewClosed { response } => {
                self.on_webview_closed(&response)?;
            }
        }
        Ok(())
    }

    pub fn on_ready(&self) {
        info!("Host runtime ready");
    }

    /// Open the settings form.
    pub fn on_show_configuration(&self) -> JoinHandle<()> {
        let host = Arc::clone(&self.host);
        let url = self.config.form_url.clone();
        debug!(url = %url, "Opening settings form");

        self.tasks.spawn(async move {
            if let Err(e) = host.open_url(&url).await {
                warn!(url = %url, error = %e, "Failed to open settings form");
            }
        })
    }

    /// Decode the web view response and send it to the watch.
    ///
    /// Fails only if the response cannot be decoded, in which case nothing
    /// is sent.
    pub fn on_webview_closed(&self, response: &str) -> Result<Transmissions, RelayError> {
        let payload = decode_webview_response(response)?;
        info!(
            fields = payload.defined_fields(),
            configuration = ?payload,
            "Configuration window returned"
        );

        let message = payload.to_app_message();
        Ok(Transmissions {
            settings: self.transmit(message, "settings"),
            feedback: self.transmit(AppMessage::new(), "settings feedback"),
        })
    }

    fn transmit(&self, message: AppMessage, label: &'static str) -> JoinHandle<Delivery> {
        let host = Arc::clone(&self.host);

        self.tasks.spawn(async move {
            let entries = message.len();
            match host.send_app_message(message).await {
                Ok(ack) => {
                    info!(
                        transmission = label,
                        transaction_id = ack.transaction_id,
                        entries,
                        "Sent app message"
                    );
                    Delivery::Acked(ack)
                }
                Err(e) => {
                    warn!(transmission = label, error = %e, "Settings feedback failed");
                    Delivery::Failed
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDispatcher;
    use crate::host::HostError;
    use async_trait::async_trait;
    use scba_sdk::objects::{SettingValue, StorageKey};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    enum Call {
        OpenUrl(Url),
        Send(AppMessage),
    }

    /// Records every call and acks or rejects all messages.
    struct RecordingHost {
        calls: mpsc::UnboundedSender<Call>,
        reject: bool,
        next_transaction: AtomicU32,
    }

    impl RecordingHost {
        fn new(reject: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<Call>) {
            let (calls, rx) = mpsc::unbounded_channel();
            let host = Self {
                calls,
                reject,
                next_transaction: AtomicU32::new(1),
            };
            (Arc::new(host), rx)
        }
    }

    #[async_trait]
    impl Host for RecordingHost {
        async fn open_url(&self, url: &Url) -> Result<(), HostError> {
            let _ = self.calls.send(Call::OpenUrl(url.clone()));
            Ok(())
        }

        async fn send_app_message(&self, message: AppMessage) -> Result<MessageAck, HostError> {
            let transaction_id = self.next_transaction.fetch_add(1, Ordering::SeqCst);
            let _ = self.calls.send(Call::Send(message));
            if self.reject {
                Err(HostError::Nack {
                    transaction_id,
                    reason: "APP_MSG_NOT_CONNECTED".to_string(),
                })
            } else {
                Ok(MessageAck { transaction_id })
            }
        }
    }

    const FULL_RESPONSE: &str = "%7B%22breath_rate%22%3A50%2C%22type1%22%3Atrue%2C%22type2%22%3Afalse%2C%22type3%22%3Atrue%2C%22type4%22%3Afalse%2C%22type5%22%3Atrue%2C%22type6%22%3Afalse%2C%22def_bottle%22%3A1%7D";

    async fn next_call(rx: &mut mpsc::UnboundedReceiver<Call>) -> Call {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("host call timed out")
            .expect("host dropped")
    }

    fn sent_messages(calls: Vec<Call>) -> Vec<AppMessage> {
        calls
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(message) => Some(message),
                Call::OpenUrl(_) => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_closed_webview_sends_renamed_settings() {
        let (host, mut rx) = RecordingHost::new(false);
        let relay = ConfigRelay::new(host, RelayConfig::default());

        let transmissions = relay.on_webview_closed(FULL_RESPONSE).unwrap();
        let (settings, feedback) = transmissions.join().await;
        assert!(matches!(settings, Delivery::Acked(_)));
        assert!(matches!(feedback, Delivery::Acked(_)));

        let calls = vec![next_call(&mut rx).await, next_call(&mut rx).await];
        let mut messages = sent_messages(calls);
        messages.sort_by_key(|m| m.len());

        assert!(messages[0].is_empty());
        let settings = &messages[1];
        let mut expected = StorageKey::ALL.to_vec();
        expected.sort();
        assert_eq!(settings.keys().collect::<Vec<_>>(), expected);
        assert_eq!(settings.get(StorageKey::BreathingRate), Some(&SettingValue::Int(50)));
        assert_eq!(settings.get(StorageKey::BottleOneAvailable), Some(&SettingValue::Bool(true)));
        assert_eq!(settings.get(StorageKey::BottleFourAvailable), Some(&SettingValue::Bool(false)));
        assert_eq!(settings.get(StorageKey::BottleFiveAvailable), Some(&SettingValue::Bool(true)));
        assert_eq!(settings.get(StorageKey::DefaultBottle), Some(&SettingValue::Int(1)));
    }

    #[tokio::test]
    async fn test_empty_payload_still_sends_twice() {
        let (host, mut rx) = RecordingHost::new(false);
        let relay = ConfigRelay::new(host, RelayConfig::default());

        relay.on_webview_closed("%7B%7D").unwrap().join().await;

        let messages = sent_messages(vec![next_call(&mut rx).await, next_call(&mut rx).await]);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(AppMessage::is_empty));
    }

    #[tokio::test]
    async fn test_any_json_payload_sends_twice() {
        let bodies = [
            r#"{"breath_rate":40.5}"#,
            r#"{"type1":[1]}"#,
            r#"{"def_bottle":{"a":1}}"#,
            r#""text""#,
            "[1,2]",
            "42",
        ];

        for body in bodies {
            let (host, mut rx) = RecordingHost::new(false);
            let relay = ConfigRelay::new(host, RelayConfig::default());

            let response = urlencoding::encode(body);
            let (settings, feedback) = relay.on_webview_closed(&response).unwrap().join().await;
            assert!(matches!(settings, Delivery::Acked(_)), "body {body}");
            assert!(matches!(feedback, Delivery::Acked(_)), "body {body}");

            let messages = sent_messages(vec![next_call(&mut rx).await, next_call(&mut rx).await]);
            assert_eq!(messages.len(), 2, "body {body}");
        }
    }

    #[tokio::test]
    async fn test_fractional_rate_is_forwarded_unchanged() {
        let (host, mut rx) = RecordingHost::new(false);
        let relay = ConfigRelay::new(host, RelayConfig::default());

        let response = urlencoding::encode(r#"{"breath_rate":40.5,"type1":true}"#);
        relay.on_webview_closed(&response).unwrap().join().await;

        let mut messages = sent_messages(vec![next_call(&mut rx).await, next_call(&mut rx).await]);
        messages.sort_by_key(|m| m.len());
        let settings = &messages[1];
        assert_eq!(settings.len(), 2);
        assert_eq!(
            settings.get(StorageKey::BreathingRate),
            Some(&SettingValue::Json(serde_json::json!(40.5)))
        );
        assert_eq!(settings.get(StorageKey::BottleOneAvailable), Some(&SettingValue::Bool(true)));
    }

    #[tokio::test]
    async fn test_drain_waits_for_spawned_calls() {
        let (host, mut rx) = RecordingHost::new(false);
        let relay = ConfigRelay::new(host, RelayConfig::default());

        relay.handle(HostEvent::ShowConfiguration).unwrap();
        relay.handle(HostEvent::WebviewClosed {
            response: FULL_RESPONSE.to_string(),
        })
        .unwrap();

        tokio::time::timeout(Duration::from_secs(1), relay.drain())
            .await
            .unwrap();
        assert_eq!(relay.in_flight(), 0);
        for _ in 0..3 {
            rx.try_recv().unwrap();
        }

        // The relay keeps working after a drain.
        relay.handle(HostEvent::ShowConfiguration).unwrap();
        relay.drain().await;
        assert!(matches!(rx.try_recv(), Ok(Call::OpenUrl(_))));
    }

    #[tokio::test]
    async fn test_aborted_transmission_counts_as_failed() {
        let settings = tokio::spawn(std::future::pending::<Delivery>());
        settings.abort();
        let feedback = tokio::spawn(async { Delivery::Acked(MessageAck { transaction_id: 7 }) });

        let (settings, feedback) = Transmissions { settings, feedback }.join().await;
        assert_eq!(settings, Delivery::Failed);
        assert_eq!(feedback, Delivery::Acked(MessageAck { transaction_id: 7 }));
    }

    #[tokio::test]
    async fn test_show_configuration_always_opens_form() {
        let (host, mut rx) = RecordingHost::new(false);
        let relay = ConfigRelay::new(host, RelayConfig::default());
        let form_url = RelayConfig::default_form_url();

        relay.on_show_configuration().await.unwrap();
        assert_eq!(next_call(&mut rx).await, Call::OpenUrl(form_url.clone()));

        relay.on_webview_closed("%7B%7D").unwrap().join().await;
        next_call(&mut rx).await;
        next_call(&mut rx).await;

        relay.on_show_configuration().await.unwrap();
        assert_eq!(next_call(&mut rx).await, Call::OpenUrl(form_url));
    }

    #[tokio::test]
    async fn test_configured_form_url_is_used() {
        let (host, mut rx) = RecordingHost::new(false);
        let url = Url::parse("https://settings.example.com/scba").unwrap();
        let relay = ConfigRelay::new(host, RelayConfig::new(url.clone()));

        assert_eq!(relay.form_url(), &url);
        relay.handle(HostEvent::ShowConfiguration).unwrap();
        assert_eq!(next_call(&mut rx).await, Call::OpenUrl(url));
    }

    #[tokio::test]
    async fn test_rejected_transmissions_are_survivable() {
        let (host, mut rx) = RecordingHost::new(true);
        let relay = ConfigRelay::new(host, RelayConfig::default());

        let (settings, feedback) = relay.on_webview_closed(FULL_RESPONSE).unwrap().join().await;
        assert_eq!(settings, Delivery::Failed);
        assert_eq!(feedback, Delivery::Failed);
        next_call(&mut rx).await;
        next_call(&mut rx).await;

        // The relay keeps handling events afterwards.
        relay.handle(HostEvent::Ready).unwrap();
        relay.handle(HostEvent::ShowConfiguration).unwrap();
        assert!(matches!(next_call(&mut rx).await, Call::OpenUrl(_)));
        let (settings, _) = relay.on_webview_closed("%7B%7D").unwrap().join().await;
        assert_eq!(settings, Delivery::Failed);
    }

    #[tokio::test]
    async fn test_malformed_payload_sends_nothing() {
        // Current behavior: the handler reports the decode error and no
        // transmission is attempted.
        let (host, mut rx) = RecordingHost::new(false);
        let relay = ConfigRelay::new(host, RelayConfig::default());

        let result = relay.on_webview_closed("CANCELLED");
        assert!(matches!(result, Err(RelayError::Payload(_))));
        let result = relay.handle(HostEvent::WebviewClosed {
            response: String::new(),
        });
        assert!(result.is_err());

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_registered_relay_handles_dispatched_events() {
        let (host, mut rx) = RecordingHost::new(false);
        let relay = Arc::new(ConfigRelay::new(host, RelayConfig::default()));

        let mut dispatcher = EventDispatcher::new();
        relay.register(&mut dispatcher);
        assert_eq!(dispatcher.listener_count(HostEventKind::Ready), 1);
        assert_eq!(dispatcher.listener_count(HostEventKind::ShowConfiguration), 1);
        assert_eq!(dispatcher.listener_count(HostEventKind::WebviewClosed), 1);

        assert_eq!(dispatcher.dispatch(HostEvent::Ready), 1);
        dispatcher.dispatch(HostEvent::WebviewClosed {
            response: "garbage".to_string(),
        });
        dispatcher.dispatch(HostEvent::ShowConfiguration);
        dispatcher.dispatch(HostEvent::WebviewClosed {
            response: FULL_RESPONSE.to_string(),
        });

        let mut calls = Vec::new();
        for _ in 0..3 {
            calls.push(next_call(&mut rx).await);
        }
        let opened = calls.iter().filter(|c| matches!(c, Call::OpenUrl(_))).count();
        assert_eq!(opened, 1);
        assert_eq!(sent_messages(calls).len(), 2);
    }
}
