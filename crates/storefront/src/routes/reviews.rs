//! Review route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use vitrina_core::{ItemId, ReviewId};

use crate::adapters::{ReviewView, ReviewVotes};
use crate::error::{AppError, Result};
use crate::marketplace::{ReviewDraft, ReviewFilters};
use crate::state::AppState;
use crate::usecases::ProductReviews;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub rating: Option<u8>,
}

/// Helpful / not helpful vote.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub user_id: String,
    pub helpful: bool,
}

fn ensure_enabled(state: &AppState) -> Result<()> {
    if state.config().features.reviews {
        Ok(())
    } else {
        Err(AppError::NotFound("reviews are disabled".to_string()))
    }
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ProductReviews>> {
    ensure_enabled(&state)?;
    let filters = ReviewFilters {
        rating: query.rating,
        limit: query.limit.unwrap_or(state.config().default_limit),
        offset: query.offset.unwrap_or(0),
    };
    Ok(Json(state.use_cases().reviews.execute(&id, filters).await?))
}

#[instrument(skip(state, draft))]
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(draft): Json<ReviewDraft>,
) -> Result<(StatusCode, Json<ReviewView>)> {
    ensure_enabled(&state)?;
    let review = state.use_cases().reviews.create_review(&id, &draft).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(skip(state, request))]
pub async fn vote(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<ReviewVotes>> {
    ensure_enabled(&state)?;
    let votes = state
        .use_cases()
        .reviews
        .mark_helpful(&id, &request.user_id, request.helpful)
        .await?;
    Ok(Json(votes))
}
