use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{Chat, ChatMessage, ChatRole, SqliteStore};

pub trait ChatStore: Send + Sync + 'static {
    /// Save `chat` for `owner` unless one of the owner's chats already holds
    /// the same messages. Returns `false` when skipped as a duplicate.
    fn save_chat(
        &self,
        owner: &str,
        chat: &Chat,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Replace the messages of an existing chat.
    fn replace_messages(
        &self,
        owner: &str,
        chat_id: Uuid,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// All chats of `owner`, oldest first.
    fn list_chats(&self, owner: &str)
    -> impl Future<Output = Result<Vec<Chat>, sqlx::Error>> + Send;

    fn get_chat(
        &self,
        owner: &str,
        chat_id: Uuid,
    ) -> impl Future<Output = Result<Option<Chat>, sqlx::Error>> + Send;
}

type MessageRow = (String, i64, String, String, String, String);

impl ChatStore for SqliteStore {
    async fn save_chat(&self, owner: &str, chat: &Chat) -> Result<bool, sqlx::Error> {
        let existing = self.list_chats(owner).await?;
        let duplicate = existing.iter().any(|saved| {
            saved.messages.len() == chat.messages.len()
                && saved
                    .messages
                    .iter()
                    .zip(&chat.messages)
                    .all(|(a, b)| a.same_as(b))
        });
        if duplicate {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO chats (id, owner, name, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
        )
        .bind(chat.id.to_string())
        .bind(owner)
        .bind(&chat.name)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        insert_messages(&mut tx, chat.id, &chat.messages).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn replace_messages(
        &self,
        owner: &str,
        chat_id: Uuid,
        messages: &[ChatMessage],
    ) -> Result<(), sqlx::Error> {
        let id = chat_id.to_string();
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE chats SET updated_at = ?1 WHERE id = ?2 AND owner = ?3")
            .bind(Utc::now().to_rfc3339())
            .bind(&id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        sqlx::query("DELETE FROM chat_messages WHERE chat_id = ?1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        insert_messages(&mut tx, chat_id, messages).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_chats(&self, owner: &str) -> Result<Vec<Chat>, sqlx::Error> {
        let chats: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, name FROM chats WHERE owner = ?1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT m.chat_id, m.position, m.id, m.role, m.content, m.created_at \
             FROM chat_messages m JOIN chats c ON c.id = m.chat_id \
             WHERE c.owner = ?1 ORDER BY m.chat_id, m.position",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(chats
            .into_iter()
            .filter_map(|(id, name)| {
                let messages = rows
                    .iter()
                    .filter(|row| row.0 == id)
                    .filter_map(message_from_row)
                    .collect();
                Some(Chat {
                    id: parse_id(&id)?,
                    name,
                    messages,
                })
            })
            .collect())
    }

    async fn get_chat(&self, owner: &str, chat_id: Uuid) -> Result<Option<Chat>, sqlx::Error> {
        let id = chat_id.to_string();
        let name: Option<(String,)> =
            sqlx::query_as("SELECT name FROM chats WHERE id = ?1 AND owner = ?2")
                .bind(&id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        let Some((name,)) = name else {
            return Ok(None);
        };

        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT chat_id, position, id, role, content, created_at \
             FROM chat_messages WHERE chat_id = ?1 ORDER BY position",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Chat {
            id: chat_id,
            name,
            messages: rows.iter().filter_map(message_from_row).collect(),
        }))
    }
}

async fn insert_messages(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    chat_id: Uuid,
    messages: &[ChatMessage],
) -> Result<(), sqlx::Error> {
    let chat_id = chat_id.to_string();
    for (position, msg) in messages.iter().enumerate() {
        sqlx::query(
            "INSERT INTO chat_messages (chat_id, position, id, role, content, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&chat_id)
        .bind(position as i64)
        .bind(msg.id.to_string())
        .bind(msg.role.to_string())
        .bind(&msg.content)
        .bind(msg.timestamp.to_rfc3339())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn parse_id(raw: &str) -> Option<Uuid> {
    match raw.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(raw = %raw, error = %e, "skipping row with malformed id");
            None
        }
    }
}

fn message_from_row(row: &MessageRow) -> Option<ChatMessage> {
    let (_, _, id, role, content, created_at) = row;
    let role = match role.parse::<ChatRole>() {
        Ok(role) => role,
        Err(e) => {
            warn!(raw = %role, error = %e, "skipping message with unknown role");
            return None;
        }
    };
    Some(ChatMessage {
        id: parse_id(id)?,
        role,
        content: content.clone(),
        timestamp: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|e| {
                warn!(raw = %created_at, error = %e, "failed to parse message timestamp; using now");
                Utc::now()
            }),
    })
}
