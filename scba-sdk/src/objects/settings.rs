//! Settings payload returned by the hosted configuration form.

use serde::{Deserialize, Serialize};

use super::message::{AppMessage, StorageKey};

/// A single value submitted by the settings form.
///
/// Values are carried verbatim from the form to the watch; the bridge never
/// coerces between variants. Anything that is not a boolean, an integer or a
/// string (fractional numbers, arrays, objects) is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Json(serde_json::Value),
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_owned())
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Text(v) => write!(f, "{v:?}"),
            SettingValue::Json(v) => write!(f, "{v}"),
        }
    }
}

/// The record the settings web view hands back when it closes.
///
/// Every field is optional. A field the form left out (or sent as `null`)
/// is undefined for the watch and produces no entry in the outgoing
/// [`AppMessage`]. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPayload {
    /// Breathing rate of a team member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breath_rate: Option<SettingValue>,
    /// Bottle type one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type1: Option<SettingValue>,
    /// Bottle type two is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type2: Option<SettingValue>,
    /// Bottle type three is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type3: Option<SettingValue>,
    /// Bottle type four is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type4: Option<SettingValue>,
    /// Bottle type five is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type5: Option<SettingValue>,
    /// Bottle type six is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type6: Option<SettingValue>,
    /// Bottle selected by default when a team is started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub def_bottle: Option<SettingValue>,
}

impl SettingsPayload {
    /// Every form field paired with the storage key it is forwarded under,
    /// in declaration order.
    pub fn fields(&self) -> [(&'static str, StorageKey, Option<&SettingValue>); 8] {
        [
            ("breath_rate", StorageKey::BreathingRate, self.breath_rate.as_ref()),
            ("type1", StorageKey::BottleOneAvailable, self.type1.as_ref()),
            ("type2", StorageKey::BottleTwoAvailable, self.type2.as_ref()),
            ("type3", StorageKey::BottleThreeAvailable, self.type3.as_ref()),
            ("type4", StorageKey::BottleFourAvailable, self.type4.as_ref()),
            ("type5", StorageKey::BottleFiveAvailable, self.type5.as_ref()),
            ("type6", StorageKey::BottleSixAvailable, self.type6.as_ref()),
            ("def_bottle", StorageKey::DefaultBottle, self.def_bottle.as_ref()),
        ]
    }

    /// Number of fields the form actually filled in.
    pub fn defined_fields(&self) -> usize {
        self.fields().iter().filter(|(_, _, v)| v.is_some()).count()
    }

    /// Rename the form fields to storage keys.
    pub fn to_app_message(&self) -> AppMessage {
        let mut message = AppMessage::new();
        for (_, key, value) in self.fields() {
            if let Some(value) = value {
                message.insert(key, value.clone());
            }
        }
        message
    }
}
