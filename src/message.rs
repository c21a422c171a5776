// src/message.rs
use serde::{Deserialize, Serialize};

/// A prior turn supplied by the widget. When the request carries its own
/// history it wins over whatever the server has stored for the conversation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HistoryTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub history: Option<Vec<HistoryTurn>>,
}

/// Which branch produced the reply. Carried in the payload so the widget and
/// the logs can tell a model answer from a local knowledge-base answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrigin {
    Provider,
    KnowledgeBase,
    Unmatched,
}

impl ReplyOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyOrigin::Provider => "provider",
            ReplyOrigin::KnowledgeBase => "knowledge_base",
            ReplyOrigin::Unmatched => "unmatched",
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub conversation_id: String,
    /// Lesson names the reply was grounded in, best match first.
    pub sources: Vec<String>,
    pub origin: ReplyOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_score: Option<u32>,
}
