use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Thread id the server expects on every freshly composed message.
pub const SOURCE_MESSAGE_ID: i64 = 1;

/// Lifecycle state of a message as tracked by the chat server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Delivered,
    Read,
    Deleted,
    Expired,
}

/// Message written to the channel. Built, serialized and dropped per dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub source_message_id: i64,
    pub content: String,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub message_status: MessageStatus,
    pub has_attachment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_group_message: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_broadcast_message: Option<bool>,
}

impl OutboundMessage {
    pub fn direct(from_user_id: i64, to_user_id: i64, content: impl Into<String>) -> Self {
        Self {
            source_message_id: SOURCE_MESSAGE_ID,
            content: content.into(),
            from_user_id,
            to_user_id,
            message_status: MessageStatus::Delivered,
            has_attachment: false,
            is_group_message: None,
            is_broadcast_message: None,
        }
    }

    pub fn group(from_user_id: i64, group_id: i64, content: impl Into<String>) -> Self {
        Self {
            is_group_message: Some(true),
            ..Self::direct(from_user_id, group_id, content)
        }
    }

    pub fn broadcast(from_user_id: i64, broadcast_id: i64, content: impl Into<String>) -> Self {
        Self {
            is_broadcast_message: Some(true),
            ..Self::direct(from_user_id, broadcast_id, content)
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Message decoded from an inbound channel frame. Never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    pub from_user_id: i64,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub to_user_id: Option<i64>,
    #[serde(default)]
    pub message_status: Option<MessageStatus>,
    #[serde(default)]
    pub is_group_message: Option<bool>,
    #[serde(default)]
    pub is_broadcast_message: Option<bool>,
}

impl InboundMessage {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Message body; a `null` or missing body reads as empty.
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// One attributed entry of the presentation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedMessage {
    pub author: String,
    pub content: String,
    pub received_at: DateTime<Local>,
}

impl PresentedMessage {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            received_at: Local::now(),
        }
    }

    /// Renders the entry the way the console log shows it.
    pub fn display_line(&self) -> String {
        format!(
            "[{}] {} : {}",
            self.received_at.format("%H:%M:%S"),
            self.author,
            self.content
        )
    }
}
