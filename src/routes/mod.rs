// src/routes/mod.rs
pub mod chat;
pub mod course;
pub mod grade;

use crate::state::SharedState;
use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState) -> Router {
    let admin_routes = Router::new()
        .route("/metrics", get(chat::get_metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/health", get(health_handler))
        .route("/api/course", get(course::course_handler))
        .route("/api/conversations/{id}", get(chat::get_conversation_handler))
        .route("/api/grade", post(grade::grade_handler))
        .nest("/admin", admin_routes)
        .fallback_service(ServeDir::new("public"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "service": "SpectroScience AI",
        "lessons": state.chat.knowledge().len(),
        "provider_configured": state.chat.provider_configured(),
    }))
}

// API key check. Admin routes stay locked when no key is configured.
async fn admin_auth(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    match req.headers().get("x-admin-key") {
        Some(val) if val == expected => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
