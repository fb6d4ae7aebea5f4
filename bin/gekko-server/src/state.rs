//! Shared application state injected into every Axum handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use gekko_core::Assistant;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::conversation::Conversation;
use crate::entities::SqliteStore;

/// Live conversations, keyed by conversation id.
///
/// Conversations idle for longer than `idle` are dropped on the next insert.
/// At `capacity` the least recently used one makes room for the new one.
/// The lock is only taken inside these methods and never across an await.
pub struct ConversationRegistry {
    conversations: Mutex<HashMap<Uuid, Entry>>,
    capacity: usize,
    idle: Duration,
}

struct Entry {
    conversation: Conversation,
    last_used: Instant,
}

impl std::fmt::Debug for ConversationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.conversations.lock().map(|c| c.len()).unwrap_or(0);
        write!(f, "ConversationRegistry({count}/{} conversations)", self.capacity)
    }
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(3600))
    }
}

impl ConversationRegistry {
    pub fn new(capacity: usize, idle: Duration) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            idle,
        }
    }

    /// Register `conversation` and return a snapshot of it.
    pub fn insert(&self, conversation: Conversation) -> Conversation {
        let snapshot = conversation.clone();
        let now = Instant::now();
        let mut map = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let before = map.len();
        map.retain(|_, e| now.duration_since(e.last_used) < self.idle);
        if map.len() < before {
            debug!(expired = before - map.len(), "dropped idle conversations");
        }
        if map.len() >= self.capacity {
            let oldest = map
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                map.remove(&id);
                debug!(conversation = %id, "evicted least recently used conversation");
            }
        }

        map.insert(
            conversation.id,
            Entry {
                conversation,
                last_used: now,
            },
        );
        snapshot
    }

    pub fn get(&self, id: Uuid) -> Option<Conversation> {
        self.with(id, |c| c.clone())
    }

    /// Run `f` on the conversation, if it exists.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&mut Conversation) -> R) -> Option<R> {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
            .map(|e| {
                e.last_used = Instant::now();
                f(&mut e.conversation)
            })
    }

    /// Forget the conversation. Its saved chat, if any, stays in the store.
    pub fn remove(&self, id: Uuid) -> Option<Conversation> {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|e| e.conversation)
    }

    /// Number of live conversations.
    pub fn count(&self) -> usize {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Saved chats.
    pub store: Arc<SqliteStore>,
    /// The question answering pipeline.
    pub assistant: Assistant,
    pub conversations: Arc<ConversationRegistry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_registry_evicts_least_recently_used() {
        let registry = ConversationRegistry::new(2, Duration::from_secs(3600));
        let first = registry.insert(Conversation::new(None));
        std::thread::sleep(Duration::from_millis(2));
        let second = registry.insert(Conversation::new(None));
        std::thread::sleep(Duration::from_millis(2));
        assert!(registry.get(first.id).is_some());
        std::thread::sleep(Duration::from_millis(2));

        let third = registry.insert(Conversation::new(None));
        assert_eq!(registry.count(), 2);
        assert!(registry.get(second.id).is_none());
        assert!(registry.get(first.id).is_some());
        assert!(registry.get(third.id).is_some());
    }

    #[test]
    fn idle_conversations_expire_on_insert() {
        let registry = ConversationRegistry::new(10, Duration::ZERO);
        let stale = registry.insert(Conversation::new(None));
        let fresh = registry.insert(Conversation::new(None));
        assert!(registry.get(stale.id).is_none());
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.remove(fresh.id).map(|c| c.id), Some(fresh.id));
        assert_eq!(registry.count(), 0);
    }
}
