#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod events;
pub mod host;
pub mod relay;

pub use config::RelayConfig;
pub use host::{Host, HostError, MessageAck};
pub use relay::{ConfigRelay, Delivery, RelayError, Transmissions};
