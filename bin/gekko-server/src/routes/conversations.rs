use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::{debug, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::conversation::{Conversation, Persist};
use crate::entities::{ChatRole, ChatStore};
use crate::error::ServerError;
use crate::middleware::auth::user_email;
use crate::schemas::conversation::{ConversationResponse, MessageResponse, UpdateLastMessageRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_conversation,
        get_conversation,
        clear_conversation,
        close_conversation,
        update_last_message
    ),
    components(schemas(ConversationResponse, MessageResponse, UpdateLastMessageRequest, ChatRole))
)]
pub struct ConversationsApi;

/// Register conversation routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/conversations", post(create_conversation))
        .route(
            "/conversations/{id}",
            get(get_conversation).delete(clear_conversation),
        )
        .route("/conversations/{id}/close", post(close_conversation))
        .route("/conversations/{id}/last-message", put(update_last_message))
}

#[utoipa::path(
    post,
    path = "/api/conversations",
    tag = "conversations",
    responses(
        (status = 200, description = "Conversation created", body = ConversationResponse),
    )
)]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ConversationResponse> {
    let conversation = state
        .conversations
        .insert(Conversation::new(user_email(&headers)));
    info!(id = %conversation.id, signed_in = conversation.owner.is_some(), "conversation created");
    Json(conversation.to_response())
}

#[utoipa::path(
    get,
    path = "/api/conversations/{id}",
    tag = "conversations",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 404, description = "Unknown conversation"),
    )
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ServerError> {
    let conversation = state.conversations.get(id).ok_or_else(|| not_found(id))?;
    Ok(Json(conversation.to_response()))
}

#[utoipa::path(
    delete,
    path = "/api/conversations/{id}",
    tag = "conversations",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation cleared", body = ConversationResponse),
        (status = 404, description = "Unknown conversation"),
    )
)]
pub async fn clear_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ServerError> {
    let conversation = state
        .conversations
        .with(id, |c| {
            c.clear();
            c.to_response()
        })
        .ok_or_else(|| not_found(id))?;
    Ok(Json(conversation))
}

/// Drop a live conversation. A saved chat bound to it is kept.
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/close",
    tag = "conversations",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation closed"),
        (status = 404, description = "Unknown conversation"),
    )
)]
pub async fn close_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let closed = state.conversations.remove(id).ok_or_else(|| not_found(id))?;
    info!(id = %id, messages = closed.messages.len(), "conversation closed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/conversations/{id}/last-message",
    tag = "conversations",
    params(("id" = Uuid, Path, description = "Conversation id")),
    request_body = UpdateLastMessageRequest,
    responses(
        (status = 200, description = "Last message updated", body = ConversationResponse),
        (status = 404, description = "Unknown conversation"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn update_last_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLastMessageRequest>,
) -> Result<Json<ConversationResponse>, ServerError> {
    let (owner, step, response) = state
        .conversations
        .with(id, |c| {
            let step = c.update_last_message(req.content);
            (c.owner.clone(), step, c.to_response())
        })
        .ok_or_else(|| not_found(id))?;
    apply(&state, owner.as_deref(), step).await?;
    Ok(Json(response))
}

/// Append a message to conversation `id` and save it if that is due.
///
/// Store failures are logged; the message stays in the conversation.
pub(super) async fn record(
    state: &AppState,
    id: Uuid,
    role: ChatRole,
    content: &str,
) -> Result<(), ServerError> {
    let threshold = state.config.persist_threshold;
    let (owner, step) = state
        .conversations
        .with(id, |c| (c.owner.clone(), c.add_message(role, content, threshold)))
        .ok_or_else(|| not_found(id))?;
    if let Err(e) = apply(state, owner.as_deref(), step).await {
        warn!(conversation = %id, error = %e, "failed to save chat");
    }
    Ok(())
}

/// Write `step` to the store on behalf of `owner`.
///
/// Anonymous conversations are never written. Replacing a chat that was
/// never stored, because it duplicated an existing one, is a no-op.
async fn apply(state: &AppState, owner: Option<&str>, step: Persist) -> Result<(), sqlx::Error> {
    let Some(owner) = owner else {
        return Ok(());
    };
    match step {
        Persist::Nothing => Ok(()),
        Persist::Create(chat) => {
            let saved = state.store.save_chat(owner, &chat).await?;
            info!(chat = %chat.id, saved, "chat reached save threshold");
            Ok(())
        }
        Persist::Replace { chat_id, messages } => {
            match state.store.replace_messages(owner, chat_id, &messages).await {
                Err(sqlx::Error::RowNotFound) => {
                    debug!(chat = %chat_id, "bound chat not stored; nothing to update");
                    Ok(())
                }
                other => other,
            }
        }
    }
}

fn not_found(id: Uuid) -> ServerError {
    ServerError::NotFound(format!("conversation {id} not found"))
}
