//! Event type definitions.

use scba_sdk::objects::InboundFrame;

/// Discriminant of a [`HostEvent`], used as the registration key for
/// listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    Ready,
    ShowConfiguration,
    WebviewClosed,
}

impl std::fmt::Display for HostEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostEventKind::Ready => write!(f, "ready"),
            HostEventKind::ShowConfiguration => write!(f, "show_configuration"),
            HostEventKind::WebviewClosed => write!(f, "webview_closed"),
        }
    }
}

/// Lifecycle events raised by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The host runtime finished starting up.
    Ready,
    /// The user asked to open the settings page.
    ShowConfiguration,
    /// The settings web view closed, carrying its URL-encoded response.
    WebviewClosed { response: String },
}

impl HostEvent {
    pub fn kind(&self) -> HostEventKind {
        match self {
            HostEvent::Ready => HostEventKind::Ready,
            HostEvent::ShowConfiguration => HostEventKind::ShowConfiguration,
            HostEvent::WebviewClosed { .. } => HostEventKind::WebviewClosed,
        }
    }

    /// Convert an inbound frame into an event.
    ///
    /// Acknowledgement frames are not events and yield `None`.
    pub fn from_frame(frame: InboundFrame) -> Option<Self> {
        match frame {
            InboundFrame::Ready => Some(HostEvent::Ready),
            InboundFrame::ShowConfiguration => Some(HostEvent::ShowConfiguration),
            InboundFrame::WebviewClosed { response } => Some(HostEvent::WebviewClosed { response }),
            InboundFrame::Ack { .. } | InboundFrame::Nack { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        assert_eq!(HostEvent::Ready.kind(), HostEventKind::Ready);
        assert_eq!(
            HostEvent::WebviewClosed {
                response: String::new()
            }
            .kind(),
            HostEventKind::WebviewClosed
        );
        assert_eq!(HostEventKind::ShowConfiguration.to_string(), "show_configuration");
    }

    #[test]
    fn test_from_frame() {
        assert_eq!(
            HostEvent::from_frame(InboundFrame::ShowConfiguration),
            Some(HostEvent::ShowConfiguration)
        );
        assert_eq!(
            HostEvent::from_frame(InboundFrame::WebviewClosed {
                response: "%7B%7D".to_string()
            }),
            Some(HostEvent::WebviewClosed {
                response: "%7B%7D".to_string()
            })
        );
        assert_eq!(HostEvent::from_frame(InboundFrame::Ack { transaction_id: 1 }), None);
    }
}
