//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;
use vitrina_core::{ItemId, VariationId};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::usecases::{
    BuyerProtectionInfo, Navigation, ProductInfo, ProductPage, ProductPageOptions,
    ShippingOptionsSummary, TotalCostInfo,
};

/// Optional variation selection.
#[derive(Debug, Default, Deserialize)]
pub struct VariationQuery {
    pub variation: Option<VariationId>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingQuery {
    pub zip: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TotalQuery {
    pub quantity: Option<u32>,
    pub zip: Option<String>,
}

/// Product info, with a variation's price, stock and pictures when selected.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(query): Query<VariationQuery>,
) -> Result<Json<ProductInfo>> {
    let use_case = &state.use_cases().product_info;
    let info = match &query.variation {
        Some(variation) => use_case.execute_with_variation(&id, variation).await?,
        None => use_case.execute(&id).await?,
    };
    Ok(Json(info))
}

/// Whole product page. Reviews, questions and related listings follow the
/// feature flags.
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(query): Query<VariationQuery>,
) -> Result<Json<ProductPage>> {
    let features = state.config().features;
    let options = ProductPageOptions {
        variation: query.variation,
        include_reviews: features.reviews,
        include_questions: features.questions,
        include_related: features.recommendations,
        page_size: state.config().default_limit,
    };
    let page = state.use_cases().product_page.execute(&id, &options).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn navigation(State(state): State<AppState>, Path(id): Path<ItemId>) -> Result<Json<Navigation>> {
    Ok(Json(state.use_cases().navigation.execute(&id).await?))
}

#[instrument(skip(state))]
pub async fn shipping(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(query): Query<ShippingQuery>,
) -> Result<Json<ShippingOptionsSummary>> {
    let zip = query
        .zip
        .filter(|zip| !zip.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("zip is required".to_string()))?;
    let summary = state
        .use_cases()
        .purchase
        .shipping_options(&id, zip.trim(), query.quantity.unwrap_or(1))
        .await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn total(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(query): Query<TotalQuery>,
) -> Result<Json<TotalCostInfo>> {
    let quantity = query.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }
    let zip = query.zip.as_deref().map(str::trim).filter(|zip| !zip.is_empty());
    let info = state
        .use_cases()
        .purchase
        .calculate_total_cost(&id, quantity, zip)
        .await?;
    Ok(Json(info))
}

pub async fn protection(State(state): State<AppState>, Path(id): Path<ItemId>) -> Json<BuyerProtectionInfo> {
    Json(state.use_cases().purchase.buyer_protection(&id).await)
}
