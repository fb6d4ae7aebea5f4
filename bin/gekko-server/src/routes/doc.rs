use utoipa::OpenApi;

use crate::routes::{chatbot, chats, conversations, health};

#[derive(OpenApi)]
#[openapi(info(
    title = "gekko-server",
    description = "Answers questions about public companies from earnings calls and financial statements",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chatbot::ChatbotApi::openapi());
    root.merge(conversations::ConversationsApi::openapi());
    root.merge(chats::ChatsApi::openapi());
    root
}
