//! Host lifecycle events and their delivery to listeners.
//!
//! # Event Flow
//!
//! 1. The host adapter turns inbound frames into [`HostEvent`]s and pushes
//!    them onto the host event channel.
//! 2. [`EventDispatcher::run`] pulls them off the channel one at a time.
//! 3. Every listener registered for the event's [`HostEventKind`] is
//!    invoked; listener errors are logged and do not stop the loop.
//!
//! Listeners are registered explicitly through [`HostEvents`] rather than
//! on a global object, so the relay can be wired to any event source.

pub mod channels;
pub mod dispatch;
pub mod types;

pub use channels::{DEFAULT_CHANNEL_BUFFER, HostEventReceiver, HostEventSender, host_event_channel};
pub use dispatch::{EventDispatcher, HostEvents, Listener, ListenerError};
pub use types::{HostEvent, HostEventKind};
