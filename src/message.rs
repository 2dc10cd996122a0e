// src/message.rs
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Message {
    /// A message stamped with a fresh id and the current time.
    pub fn new(sender: Sender, content: impl Into<String>, model: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: iso_now(),
            model,
        }
    }
}

pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: Message,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    /// `"0"`, `"1"` or `"all"`.
    pub deleted_count: String,
}

/// Arguments of `sendMessage`, after extraction from the operation's `input`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatInput {
    pub message: Option<String>,
    pub user_id: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteHistoryInput {
    pub user_id: Option<String>,
    pub message_id: Option<String>,
}
