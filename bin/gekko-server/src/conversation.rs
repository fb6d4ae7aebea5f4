//! In-memory conversation log.
//!
//! A conversation only becomes a saved [`Chat`] once it holds `threshold`
//! messages. Mutations return the [`Persist`] step the caller should apply
//! to the store; the log itself never does I/O.

use uuid::Uuid;

use crate::entities::{Chat, ChatMessage, ChatRole};

/// Store write implied by a conversation mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Persist {
    Nothing,
    /// First save of the conversation.
    Create(Chat),
    /// Overwrite the messages of the bound chat.
    Replace {
        chat_id: Uuid,
        messages: Vec<ChatMessage>,
    },
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    /// E-mail of the signed-in user; anonymous conversations are never saved.
    pub owner: Option<String>,
    /// Saved chat this conversation is bound to.
    pub chat_id: Option<Uuid>,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(owner: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            chat_id: None,
            messages: Vec::new(),
        }
    }

    pub fn add_message(
        &mut self,
        role: ChatRole,
        content: impl Into<String>,
        threshold: usize,
    ) -> Persist {
        self.messages.push(ChatMessage::new(role, content));
        let count = self.messages.len();
        match self.chat_id {
            Some(chat_id) if count >= threshold => Persist::Replace {
                chat_id,
                messages: self.messages.clone(),
            },
            Some(_) => Persist::Nothing,
            None if count == threshold => {
                let chat = Chat {
                    id: Uuid::new_v4(),
                    name: self.messages[0].content.clone(),
                    messages: self.messages.clone(),
                };
                self.chat_id = Some(chat.id);
                Persist::Create(chat)
            }
            None => Persist::Nothing,
        }
    }

    /// Overwrite the last message if it came from the assistant.
    pub fn update_last_message(&mut self, content: impl Into<String>) -> Persist {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Assistant {
                last.content = content.into();
            }
        }
        match self.chat_id {
            Some(chat_id) => Persist::Replace {
                chat_id,
                messages: self.messages.clone(),
            },
            None => Persist::Nothing,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.chat_id = None;
    }

    pub fn load_chat(&mut self, chat: Chat) {
        self.chat_id = Some(chat.id);
        self.messages = chat.messages;
    }
}
