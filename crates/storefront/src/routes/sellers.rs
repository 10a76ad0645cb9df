//! Seller route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use vitrina_core::SellerId;

use crate::error::Result;
use crate::state::AppState;
use crate::usecases::{PaymentMethodsInfo, SellerInfo};

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    /// Purchase amount; adds installment plans to every credit card.
    pub amount: Option<Decimal>,
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<SellerId>) -> Result<Json<SellerInfo>> {
    Ok(Json(state.use_cases().seller_info.execute(id).await?))
}

#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
    Path(id): Path<SellerId>,
    Query(query): Query<AmountQuery>,
) -> Result<Json<PaymentMethodsInfo>> {
    let methods = state
        .use_cases()
        .payment_methods
        .execute(id, query.amount)
        .await?;
    Ok(Json(methods))
}
