//! HTTP route handlers for the JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                             - Health check
//!
//! # Products
//! GET  /api/products/{id}                  - Product info (?variation=)
//! GET  /api/products/{id}/page             - Aggregated product page (?variation=)
//! GET  /api/products/{id}/navigation       - Breadcrumbs and JSON-LD
//! GET  /api/products/{id}/shipping         - Shipping summary (?zip&quantity)
//! GET  /api/products/{id}/total            - Total cost (?quantity&zip)
//! GET  /api/products/{id}/protection       - Buyer protection
//!
//! # Reviews and questions
//! GET  /api/products/{id}/reviews          - Reviews (?limit&offset&rating)
//! POST /api/products/{id}/reviews          - Create review
//! POST /api/reviews/{id}/votes             - Helpful / not helpful
//! GET  /api/products/{id}/questions        - Questions (?limit&offset)
//! POST /api/products/{id}/questions        - Ask question
//!
//! # Sellers and categories
//! GET  /api/sellers/{id}                   - Seller info
//! GET  /api/sellers/{id}/payment-methods   - Payment methods (?amount)
//! GET  /api/categories/{id}/filters        - Category filters
//!
//! # Purchase
//! POST /api/cart                           - Add to cart
//! POST /api/checkout                       - Initiate checkout
//! ```

pub mod cart;
pub mod categories;
pub mod products;
pub mod questions;
pub mod reviews;
pub mod sellers;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, header},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::services::DataSource;
use crate::state::AppState;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/page", get(products::page))
        .route("/{id}/navigation", get(products::navigation))
        .route("/{id}/shipping", get(products::shipping))
        .route("/{id}/total", get(products::total))
        .route("/{id}/protection", get(products::protection))
        .route("/{id}/reviews", get(reviews::index).post(reviews::create))
        .route("/{id}/questions", get(questions::index).post(questions::ask))
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(sellers::show))
        .route("/{id}/payment-methods", get(sellers::payment_methods))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/products", product_routes())
        .nest("/api/sellers", seller_routes())
        .route("/api/reviews/{id}/votes", post(reviews::vote))
        .route("/api/categories/{id}/filters", get(categories::filters))
        .route("/api/cart", post(cart::add))
        .route("/api/checkout", post(cart::checkout))
}

/// Build the full application: routes, state and HTTP layers.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    routes()
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Read-mostly public API: any origin, no credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

async fn not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub data_source: DataSource,
}

/// Liveness health check endpoint.
///
/// Reports which backend answers service calls. Does not check the
/// marketplace API.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        data_source: state.context().data_source(),
    })
}
