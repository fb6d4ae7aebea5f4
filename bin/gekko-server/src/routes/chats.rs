use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::entities::ChatStore;
use crate::error::ServerError;
use crate::middleware::auth::user_email;
use crate::schemas::conversation::{ChatResponse, ConversationResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_chats, load_chat), components(schemas(ChatResponse)))]
pub struct ChatsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", get(list_chats))
        .route("/chats/{id}/load", post(load_chat))
}

/// Saved chats of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Saved chats, oldest first", body = Vec<ChatResponse>),
        (status = 401, description = "No signed-in user"),
    )
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatResponse>>, ServerError> {
    let owner = user_email(&headers).ok_or(ServerError::Unauthorised)?;
    let chats = state.store.list_chats(&owner).await?;
    Ok(Json(chats.iter().map(|c| c.to_response()).collect()))
}

/// Open a new conversation bound to a saved chat.
#[utoipa::path(
    post,
    path = "/api/chats/{id}/load",
    tag = "chats",
    params(("id" = Uuid, Path, description = "Saved chat id")),
    responses(
        (status = 200, description = "Conversation bound to the chat", body = ConversationResponse),
        (status = 401, description = "No signed-in user"),
        (status = 404, description = "Unknown chat"),
    )
)]
pub async fn load_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ServerError> {
    let owner = user_email(&headers).ok_or(ServerError::Unauthorised)?;
    let chat = state
        .store
        .get_chat(&owner, id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("chat {id} not found")))?;

    let mut conversation = Conversation::new(Some(owner));
    conversation.load_chat(chat);
    let conversation = state.conversations.insert(conversation);
    info!(id = %conversation.id, chat = %id, "chat loaded");
    Ok(Json(conversation.to_response()))
}
