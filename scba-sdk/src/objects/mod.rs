pub mod frames;
pub mod message;
pub mod settings;

pub use frames::{InboundFrame, OutboundFrame};
pub use message::{AppMessage, StorageKey};
pub use settings::{SettingValue, SettingsPayload};
