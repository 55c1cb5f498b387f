use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

const DEVICE_PREFIX: &str = "device_";

/// Sequential device identity, rendered on the wire as `device_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DEVICE_PREFIX}{}", self.0)
    }
}

impl From<DeviceId> for String {
    fn from(value: DeviceId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix(DEVICE_PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(DeviceId)
            .ok_or(ProtocolError::InvalidDeviceId(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(pub String);

impl ControlId {
    pub fn for_device(device_id: DeviceId, index: usize) -> Self {
        Self(format!("{device_id}_control_{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControlId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Switch,
    Slider,
    PushButton,
    Toggle,
    Dial,
}

/// Catalog template for a control. Two specs are the same control only if every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ControlKind,
    pub color: String,
    pub min_value: i64,
    pub max_value: i64,
}

impl ControlSpec {
    pub fn new(
        name: impl Into<String>,
        kind: ControlKind,
        color: impl Into<String>,
        min_value: i64,
        max_value: i64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            color: color.into(),
            min_value,
            max_value,
        }
    }
}

/// A spec as handed to one device, with the runtime id the device reports changes under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedControl {
    pub id: ControlId,
    #[serde(rename = "type")]
    pub kind: ControlKind,
    pub color: String,
    pub label: String,
    pub min_value: i64,
    pub max_value: i64,
    pub position: i64,
}

impl AssignedControl {
    pub fn from_spec(id: ControlId, spec: &ControlSpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            color: spec.color.clone(),
            label: spec.name.clone(),
            min_value: spec.min_value,
            max_value: spec.max_value,
            position: spec.min_value,
        }
    }
}
