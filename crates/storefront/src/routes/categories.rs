//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use vitrina_core::CategoryId;

use crate::error::Result;
use crate::state::AppState;
use crate::usecases::CategoryFilters;

pub async fn filters(State(state): State<AppState>, Path(id): Path<CategoryId>) -> Result<Json<CategoryFilters>> {
    Ok(Json(state.use_cases().navigation.category_filters(&id).await?))
}
