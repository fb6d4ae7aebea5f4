use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a conversation; a row of `chat_messages` once saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Same message, ignoring sub-second timestamp drift from storage.
    pub fn same_as(&self, other: &ChatMessage) -> bool {
        self.id == other.id && self.role == other.role && self.content == other.content
    }
}

/// A saved conversation; a row of `chats`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: Uuid,
    /// The first message of the conversation.
    pub name: String,
    pub messages: Vec<ChatMessage>,
}
