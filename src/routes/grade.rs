use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    services::grading::{self, AnswerSubmission, GradeReport},
    state::SharedState,
};

#[derive(Deserialize)]
pub struct GradeRequest {
    #[serde(default)]
    pub assignment_id: String,
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Serialize)]
pub struct GradeResponse {
    pub success: bool,
    pub assignment_id: String,
    #[serde(flatten)]
    pub report: GradeReport,
}

pub async fn grade_handler(
    State(state): State<SharedState>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<GradeResponse>, AppError> {
    if payload.answers.is_empty() {
        return Err(AppError::BadRequest("No answers provided".to_string()));
    }

    let provider = state.provider.as_ref().ok_or(AppError::ProviderRequired)?;

    let report = grading::grade_answers(provider, &payload.answers)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!("grading failed: {err}")))?;

    Ok(Json(GradeResponse {
        success: true,
        assignment_id: payload.assignment_id,
        report,
    }))
}
