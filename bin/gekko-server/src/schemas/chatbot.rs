use gekko_core::{Answer, QueryType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotRequest {
    /// The user's question.
    #[serde(default)]
    pub question: String,
    /// Answer in the Gordon Gekko persona.
    #[serde(default)]
    pub is_gekko: bool,
    /// Record the exchange in this conversation.
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotResponse {
    #[schema(value_type = String, example = "earnings_call")]
    pub query_type: QueryType,
    pub summary: String,
}

impl From<Answer> for ChatbotResponse {
    fn from(answer: Answer) -> Self {
        Self {
            query_type: answer.query_type,
            summary: answer.summary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteStatus {
    pub message: String,
}
