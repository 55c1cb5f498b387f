use serde::{Deserialize, Serialize};

use crate::{
    domain::{AssignedControl, ControlId, DeviceId},
    error::ProtocolError,
};

/// Frames sent by a control panel. Any unrecognised `type` lands in `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ControlChange {
        control_id: ControlId,
        value: i64,
    },
    #[serde(other)]
    Ignored,
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Init {
        device_id: DeviceId,
        controls: Vec<AssignedControl>,
    },
    NewTask {
        problem: String,
        instruction: String,
        target_device: DeviceId,
    },
    Success {
        message: String,
        score: u64,
    },
    SessionState {
        active: bool,
        score: u64,
    },
}

impl ServerEvent {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub problem: String,
    pub instruction: String,
    pub target_device: DeviceId,
}

/// What the operator display shows: score, live task and how many panels are connected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub game_active: bool,
    pub score: u64,
    pub device_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskView>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
