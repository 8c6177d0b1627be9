// ── Wire message types ──
//
// The envelope every request and notification travels in. Framing and
// encryption belong to the connection task; these types only describe
// what is being said.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Verb carried by a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Action {
    Get,
    Post,
    Response,
    Notify,
}

/// A single request, response, or notification.
///
/// `sid`, `msg_id` and `version` are envelope metadata the session fills
/// in when it frames the message; callers building requests leave them
/// at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Resource path, e.g. `"/ro/values"`.
    pub resource: String,

    pub action: Action,

    /// Payload. `Null` when the message carries none.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,

    /// Session id assigned by the device.
    #[serde(rename = "sID", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<u64>,

    /// Per-session message counter.
    #[serde(rename = "msgID", default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<u64>,

    /// Resource version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Error code, present only on failed responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

fn default_version() -> u32 {
    1
}

impl Message {
    pub fn new(resource: impl Into<String>, action: Action) -> Self {
        Self {
            resource: resource.into(),
            action,
            data: Value::Null,
            sid: None,
            msg_id: None,
            version: default_version(),
            code: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Build the `RESPONSE` answering this message, echoing its envelope ids.
    pub fn response(&self, data: Value) -> Self {
        Self {
            resource: self.resource.clone(),
            action: Action::Response,
            data,
            sid: self.sid,
            msg_id: self.msg_id,
            version: self.version,
            code: None,
        }
    }

    /// Returns `true` if the device reported an error for this message.
    pub fn is_error(&self) -> bool {
        self.code.is_some()
    }
}
