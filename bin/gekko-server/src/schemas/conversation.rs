use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::entities::{Chat, ChatMessage, ChatRole};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    /// RFC 3339.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    /// Saved chat the conversation is bound to.
    pub chat_id: Option<Uuid>,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub id: Uuid,
    pub name: String,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateLastMessageRequest {
    pub content: String,
}

impl ChatMessage {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id,
            role: self.role,
            content: self.content.clone(),
            timestamp: self.timestamp.to_rfc3339(),
        }
    }
}

impl Conversation {
    pub fn to_response(&self) -> ConversationResponse {
        ConversationResponse {
            id: self.id,
            chat_id: self.chat_id,
            messages: self.messages.iter().map(ChatMessage::to_response).collect(),
        }
    }
}

impl Chat {
    pub fn to_response(&self) -> ChatResponse {
        ChatResponse {
            id: self.id,
            name: self.name.clone(),
            messages: self.messages.iter().map(ChatMessage::to_response).collect(),
        }
    }
}
