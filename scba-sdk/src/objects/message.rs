//! Storage keys and the key-value app message sent to the watch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::settings::SettingValue;

/// Persistent storage keys understood by the tracker firmware.
///
/// The discriminants are the numeric keys the firmware reads; the serde
/// names are the symbolic app keys declared by the watch app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum StorageKey {
    #[serde(rename = "SCBA_STORE_KEY_BREATHING_RATE")]
    BreathingRate = 0x0002,
    #[serde(rename = "SCBA_STORE_KEY_BOTTLE_ONE_AVAILABLE")]
    BottleOneAvailable = 0x0003,
    #[serde(rename = "SCBA_STORE_KEY_BOTTLE_TWO_AVAILABLE")]
    BottleTwoAvailable = 0x0004,
    #[serde(rename = "SCBA_STORE_KEY_BOTTLE_THREE_AVAILABLE")]
    BottleThreeAvailable = 0x0005,
    #[serde(rename = "SCBA_STORE_KEY_BOTTLE_FOUR_AVAILABLE")]
    BottleFourAvailable = 0x0006,
    #[serde(rename = "SCBA_STORE_KEY_BOTTLE_FIVE_AVAILABLE")]
    BottleFiveAvailable = 0x0008,
    #[serde(rename = "SCBA_STORE_KEY_BOTTLE_SIX_AVAILABLE")]
    BottleSixAvailable = 0x0009,
    #[serde(rename = "SCBA_STORE_KEY_DEFAULT_BOTTLE")]
    DefaultBottle = 0x0007,
}

impl StorageKey {
    pub const ALL: [StorageKey; 8] = [
        StorageKey::BreathingRate,
        StorageKey::BottleOneAvailable,
        StorageKey::BottleTwoAvailable,
        StorageKey::BottleThreeAvailable,
        StorageKey::BottleFourAvailable,
        StorageKey::BottleFiveAvailable,
        StorageKey::BottleSixAvailable,
        StorageKey::DefaultBottle,
    ];

    /// Numeric key the firmware stores the value under.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Symbolic app key name.
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::BreathingRate => "SCBA_STORE_KEY_BREATHING_RATE",
            StorageKey::BottleOneAvailable => "SCBA_STORE_KEY_BOTTLE_ONE_AVAILABLE",
            StorageKey::BottleTwoAvailable => "SCBA_STORE_KEY_BOTTLE_TWO_AVAILABLE",
            StorageKey::BottleThreeAvailable => "SCBA_STORE_KEY_BOTTLE_THREE_AVAILABLE",
            StorageKey::BottleFourAvailable => "SCBA_STORE_KEY_BOTTLE_FOUR_AVAILABLE",
            StorageKey::BottleFiveAvailable => "SCBA_STORE_KEY_BOTTLE_FIVE_AVAILABLE",
            StorageKey::BottleSixAvailable => "SCBA_STORE_KEY_BOTTLE_SIX_AVAILABLE",
            StorageKey::DefaultBottle => "SCBA_STORE_KEY_DEFAULT_BOTTLE",
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.code() == code)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A key-value dictionary delivered to the watch in a single transmission.
///
/// Serialized as a JSON object keyed by symbolic storage key name:
///
/// ```json
/// {"SCBA_STORE_KEY_BREATHING_RATE":50,"SCBA_STORE_KEY_DEFAULT_BOTTLE":1}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppMessage {
    entries: BTreeMap<StorageKey, SettingValue>,
}

impl AppMessage {
    /// An empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value if any.
    pub fn insert(&mut self, key: StorageKey, value: SettingValue) -> Option<SettingValue> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: StorageKey) -> Option<&SettingValue> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = StorageKey> + '_ {
        self.entries.keys().copied()
    }

    /// Entries addressed by numeric key, for hosts that do not know the
    /// symbolic app key names.
    pub fn numeric_entries(&self) -> Vec<(u32, &SettingValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.code(), value))
            .collect()
    }
}
