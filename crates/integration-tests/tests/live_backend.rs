//! Integration tests for the live backend.
//!
//! The marketplace API is replaced by an in-process axum server that counts
//! hits, records the `Authorization` header, can answer with a number of
//! `429` responses before serving the listing, and can be taken down so every
//! listing request fails with `500`.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use vitrina_core::{CartId, ItemId, SiteId};
use vitrina_integration_tests::{config_with, serve};
use vitrina_storefront::api::{ApiClient, ApiError};
use vitrina_storefront::config::ApiConfig;
use vitrina_storefront::context::{ContextBuilder, ServiceContext};
use vitrina_storefront::fixtures::NetworkSimulator;
use vitrina_storefront::marketplace::{Cart, CartItem, Item};
use vitrina_storefront::services::{
    DataSource, LiveBackend, ProductService, PurchaseService, ServiceError,
};

const LISTING: &str = "MCO777";
const CART: &str = "c1";
const FIXTURE_LISTING: &str = "MCO123456789";

#[derive(Default)]
struct FakeApi {
    hits: AtomicUsize,
    rate_limited: Mutex<u32>,
    authorization: Mutex<Option<String>>,
    down: AtomicBool,
    cart_quantity: Mutex<u32>,
}

impl FakeApi {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn item(State(fake): State<Arc<FakeApi>>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    *fake.authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    {
        let mut remaining = fake.rate_limited.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return StatusCode::TOO_MANY_REQUESTS.into_response();
        }
    }

    if fake.down.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match id.as_str() {
        LISTING => Json(Item {
            id: ItemId::new(LISTING),
            title: "Fake phone".to_owned(),
            price: Decimal::from(1000),
            available_quantity: 3,
            ..Item::default()
        })
        .into_response(),
        "MCO500" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "message": "not_found" }))).into_response(),
    }
}

fn cart_with(quantity: u32) -> Cart {
    let mut cart = Cart {
        id: CartId::new(CART),
        buyer_id: "buyer_1".to_owned(),
        items: vec![CartItem {
            id: ItemId::new(LISTING),
            quantity,
            unit_price: Decimal::from(1000),
            ..CartItem::default()
        }],
        ..Cart::default()
    };
    cart.recompute();
    cart
}

async fn cart(State(fake): State<Arc<FakeApi>>, Path(id): Path<String>) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    if id != CART {
        return StatusCode::NOT_FOUND.into_response();
    }
    let quantity = *fake.cart_quantity.lock().unwrap();
    Json(cart_with(quantity)).into_response()
}

async fn update_cart_item(
    State(fake): State<Arc<FakeApi>>,
    Path((_cart, _item)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let quantity = body["quantity"]
        .as_u64()
        .and_then(|quantity| u32::try_from(quantity).ok())
        .unwrap_or_default();
    *fake.cart_quantity.lock().unwrap() = quantity;
    Json(cart_with(quantity)).into_response()
}

async fn start(fake: Arc<FakeApi>) -> String {
    let router = Router::new()
        .route("/items/{id}", get(item))
        .route("/carts/{id}", get(cart))
        .route("/carts/{id}/items/{item}", put(update_cart_item))
        .with_state(fake);
    serve(router).await
}

fn api_config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        timeout: Duration::from_secs(2),
        auth_token: None,
        cache_ttl: None,
    }
}

fn backend(config: &ApiConfig) -> LiveBackend {
    let client = ApiClient::with_retry_delay(config, Duration::from_millis(1)).unwrap();
    LiveBackend::new(client, SiteId::Mco)
}

fn live_context(base_url: &str, fallback_to_mock: &str) -> ServiceContext {
    let config = config_with(&[
        ("USE_MOCK_DATA", "false"),
        ("API_BASE_URL", base_url),
        ("FALLBACK_TO_MOCK", fallback_to_mock),
    ]);
    ContextBuilder::new(&config)
        .simulator(NetworkSimulator::instant())
        .retry_base_delay(Duration::from_millis(1))
        .build()
        .unwrap()
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test]
async fn test_rate_limit_is_retried_until_success() {
    let fake = Arc::new(FakeApi::default());
    *fake.rate_limited.lock().unwrap() = 2;
    let backend = backend(&api_config(start(fake.clone()).await));

    let item = backend.get_item(&ItemId::new(LISTING)).await.unwrap().data;

    assert_eq!(item.title, "Fake phone");
    assert_eq!(fake.hits(), 3);
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_three_attempts() {
    let fake = Arc::new(FakeApi::default());
    *fake.rate_limited.lock().unwrap() = 10;
    let backend = backend(&api_config(start(fake.clone()).await));

    let err = backend.get_item(&ItemId::new(LISTING)).await.unwrap_err();

    assert!(matches!(err, ServiceError::Transport(ApiError::RateLimited)));
    assert_eq!(fake.hits(), 3);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let fake = Arc::new(FakeApi::default());
    let backend = backend(&api_config(start(fake.clone()).await));

    let err = backend.get_item(&ItemId::new("MCO500")).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP Error: 500 Internal Server Error");
    assert_eq!(fake.hits(), 1);
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_404_becomes_not_found() {
    let fake = Arc::new(FakeApi::default());
    let backend = backend(&api_config(start(fake.clone()).await));

    let err = backend.get_item(&ItemId::new("MCO404")).await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert_eq!(err.to_string(), "Product with id MCO404 not found");
}

// =============================================================================
// Headers and Cache
// =============================================================================

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let fake = Arc::new(FakeApi::default());
    let mut config = api_config(start(fake.clone()).await);
    config.auth_token = Some(SecretString::from("secret-token"));
    let backend = backend(&config);

    backend.get_item(&ItemId::new(LISTING)).await.unwrap();
    assert_eq!(
        fake.authorization.lock().unwrap().as_deref(),
        Some("Bearer secret-token")
    );

    backend.client().clear_auth_token();
    backend.get_item(&ItemId::new(LISTING)).await.unwrap();
    assert!(fake.authorization.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_cached_get_skips_the_network() {
    let fake = Arc::new(FakeApi::default());
    let mut config = api_config(start(fake.clone()).await);
    config.cache_ttl = Some(Duration::from_secs(60));
    let backend = backend(&config);

    let first = backend.get_item(&ItemId::new(LISTING)).await.unwrap().data;
    let second = backend.get_item(&ItemId::new(LISTING)).await.unwrap().data;

    assert_eq!(first, second);
    assert_eq!(fake.hits(), 1);
}

#[tokio::test]
async fn test_cart_update_is_visible_to_cached_reads() {
    let fake = Arc::new(FakeApi::default());
    *fake.cart_quantity.lock().unwrap() = 1;
    let mut config = api_config(start(fake.clone()).await);
    config.cache_ttl = Some(Duration::from_secs(60));
    let backend = backend(&config);
    let cart_id = CartId::new(CART);
    let listing = ItemId::new(LISTING);

    let before = backend.get_cart(&cart_id).await.unwrap().data;
    assert_eq!(before.item(&listing).unwrap().quantity, 1);

    let updated = backend
        .update_cart_item(&cart_id, &listing, 3)
        .await
        .unwrap()
        .data;
    let after = backend.get_cart(&cart_id).await.unwrap().data;

    assert_eq!(after.item(&listing).unwrap().quantity, 3);
    assert_eq!(after.summary.total_amount, Decimal::from(3000));
    assert_eq!(after, updated);
    assert_eq!(fake.hits(), 2);
}

#[tokio::test]
async fn test_token_change_drops_cached_reads() {
    let fake = Arc::new(FakeApi::default());
    let mut config = api_config(start(fake.clone()).await);
    config.cache_ttl = Some(Duration::from_secs(60));
    config.auth_token = Some(SecretString::from("first-token"));
    let backend = backend(&config);
    let listing = ItemId::new(LISTING);

    backend.get_item(&listing).await.unwrap();
    backend.get_item(&listing).await.unwrap();
    assert_eq!(fake.hits(), 1);

    backend
        .client()
        .set_auth_token(SecretString::from("second-token"));
    backend.get_item(&listing).await.unwrap();

    assert_eq!(fake.hits(), 2);
    assert_eq!(
        fake.authorization.lock().unwrap().as_deref(),
        Some("Bearer second-token")
    );
}

// =============================================================================
// Data Source Switching
// =============================================================================

#[tokio::test]
async fn test_context_switches_between_live_and_fixture() {
    let fake = Arc::new(FakeApi::default());
    let base_url = start(fake.clone()).await;
    let context = live_context(&base_url, "false");
    assert_eq!(context.data_source(), DataSource::Live);

    let fixture_only = ItemId::new(FIXTURE_LISTING);
    let live = context.resolver().current().product.get_item(&ItemId::new(LISTING)).await;
    assert_eq!(live.unwrap().data.title, "Fake phone");
    let missing = context.resolver().current().product.get_item(&fixture_only).await;
    assert!(matches!(missing, Err(ServiceError::NotFound { .. })));

    context.set_data_source(DataSource::Fixture);
    let fixture = context.resolver().current().product.get_item(&fixture_only).await;
    assert_eq!(fixture.unwrap().data.id, fixture_only);
    assert_eq!(fake.hits(), 2);
}

// =============================================================================
// Fixture Fallback
// =============================================================================

#[tokio::test]
async fn test_server_error_surfaces_without_fallback() {
    let fake = Arc::new(FakeApi::default());
    fake.down.store(true, Ordering::SeqCst);
    let context = live_context(&start(fake.clone()).await, "false");

    let err = context
        .use_cases()
        .product_info
        .execute(&ItemId::new(FIXTURE_LISTING))
        .await
        .unwrap_err();

    assert!(!err.is_not_found());
    assert!(err.to_string().contains("500 Internal Server Error"));
}

#[tokio::test]
async fn test_server_error_falls_back_to_fixtures() {
    let fake = Arc::new(FakeApi::default());
    fake.down.store(true, Ordering::SeqCst);
    let context = live_context(&start(fake.clone()).await, "true");
    let listing = ItemId::new(FIXTURE_LISTING);

    let info = context.use_cases().product_info.execute(&listing).await.unwrap();

    assert_eq!(info.product.id, listing);
    assert_eq!(info.images.len(), info.product.pictures.len());
    assert!(!info.images.is_empty());
    assert_eq!(context.data_source(), DataSource::Live);
    assert!(fake.hits() >= 1);
}

#[tokio::test]
async fn test_not_found_does_not_fall_back() {
    let fake = Arc::new(FakeApi::default());
    let context = live_context(&start(fake.clone()).await, "true");

    let err = context
        .use_cases()
        .product_info
        .execute(&ItemId::new(FIXTURE_LISTING))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}
