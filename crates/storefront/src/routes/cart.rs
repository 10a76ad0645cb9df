//! Cart and checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::marketplace::{CartRequest, CheckoutRequest};
use crate::state::AppState;
use crate::usecases::{CartConfirmation, CheckoutConfirmation};

/// Open a cart with the requested listing after a stock check.
#[instrument(skip(state, request), fields(item_id = %request.item_id))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<CartRequest>,
) -> Result<(StatusCode, Json<CartConfirmation>)> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }
    let confirmation = state.use_cases().purchase.add_to_cart(&request).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[instrument(skip(state, request), fields(cart_id = %request.cart_id))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutConfirmation>> {
    Ok(Json(state.use_cases().purchase.initiate_checkout(&request).await?))
}
