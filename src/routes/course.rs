use axum::{Json, extract::State};
use serde::Serialize;

use crate::{services::knowledge::WeekOverview, state::SharedState};

#[derive(Serialize)]
pub struct CourseResponse {
    pub success: bool,
    pub total_weeks: usize,
    pub total_lessons: usize,
    pub weeks: Vec<WeekOverview>,
}

pub async fn course_handler(State(state): State<SharedState>) -> Json<CourseResponse> {
    let knowledge = state.chat.knowledge();
    let weeks: Vec<WeekOverview> = knowledge.weeks().into_values().collect();

    Json(CourseResponse {
        success: true,
        total_weeks: weeks.len(),
        total_lessons: knowledge.len(),
        weeks,
    })
}
