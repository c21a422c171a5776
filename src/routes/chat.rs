use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, TurnRole},
    services::metrics_manager::MetricsData,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let conversation_id = match &payload.conversation_id {
        Some(id) if !id.trim().is_empty() => {
            state.conversations.ensure(id).await;
            id.clone()
        }
        _ => state.conversations.create().await,
    };

    // Widget-supplied history wins; otherwise use what we have stored.
    let history = match &payload.history {
        Some(turns) => turns.clone(),
        None => state
            .conversations
            .history(&conversation_id)
            .await
            .unwrap_or_default(),
    };

    let outcome = state.chat.answer(trimmed, &history).await;

    state.metrics.increment_origin(outcome.origin.as_str()).await;
    for source in &outcome.sources {
        state.metrics.increment_lesson(source).await;
    }

    state
        .conversations
        .append_turn(&conversation_id, TurnRole::User, trimmed)
        .await;
    state
        .conversations
        .append_turn(&conversation_id, TurnRole::Assistant, &outcome.reply)
        .await;

    Ok(Json(ChatResponse {
        success: true,
        response: outcome.reply,
        conversation_id,
        sources: outcome.sources,
        origin: outcome.origin,
        matched_score: outcome.matched_score,
    }))
}

pub async fn get_conversation_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let turns = state
        .conversations
        .history(&id)
        .await
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "conversation_id": id,
        "messages": turns,
    })))
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
