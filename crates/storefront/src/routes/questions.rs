//! Question route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use vitrina_core::{ItemId, UserId};

use super::PageQuery;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::usecases::{ProductQuestions, QuestionSubmission};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub text: String,
    pub user_id: UserId,
}

fn ensure_enabled(state: &AppState) -> Result<()> {
    if state.config().features.questions {
        Ok(())
    } else {
        Err(AppError::NotFound("questions are disabled".to_string()))
    }
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductQuestions>> {
    ensure_enabled(&state)?;
    let limit = query.limit.unwrap_or(state.config().default_limit);
    let questions = state
        .use_cases()
        .questions
        .execute(&id, Some(limit), query.offset)
        .await?;
    Ok(Json(questions))
}

#[instrument(skip(state, request))]
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(request): Json<AskRequest>,
) -> Result<(StatusCode, Json<QuestionSubmission>)> {
    ensure_enabled(&state)?;
    let submission = state
        .use_cases()
        .questions
        .ask_question(&id, &request.text, request.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}
