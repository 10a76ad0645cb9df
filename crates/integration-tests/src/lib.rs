//! Integration tests for Vitrina.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrina-integration-tests
//! ```
//!
//! Nothing external is needed: the fixture backend is in memory and the live
//! backend is exercised against an in-process fake of the marketplace API.
//!
//! # Test Categories
//!
//! - `fixture_pipeline` - Use cases over the fixture backend
//! - `api_routes` - JSON API through the axum router
//! - `live_backend` - HTTP client and live services against the fake API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::Router;
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::context::{ContextBuilder, ServiceContext};
use vitrina_storefront::fixtures::{FixtureStore, NetworkSimulator};
use vitrina_storefront::state::AppState;

/// Testing profile with the given overrides applied.
///
/// # Panics
///
/// Panics if an override does not parse.
#[must_use]
pub fn config_with(overrides: &[(&str, &str)]) -> StorefrontConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("APP_ENV".to_owned(), "testing".to_owned()),
        ("MOCK_DELAY_MS".to_owned(), "0".to_owned()),
        ("MOCK_ERROR_RATE".to_owned(), "0".to_owned()),
    ]);
    for (key, value) in overrides {
        vars.insert((*key).to_owned(), (*value).to_owned());
    }
    StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
        .unwrap_or_else(|e| panic!("invalid test configuration: {e}"))
}

/// Fixture-backed context over a fresh store, with no simulated latency.
///
/// # Panics
///
/// Panics if the context cannot be built.
#[must_use]
pub fn fixture_context(config: &StorefrontConfig) -> ServiceContext {
    let store = FixtureStore::seeded().unwrap_or_else(|e| panic!("fixtures: {e}"));
    ContextBuilder::new(config)
        .fixture_store(store)
        .simulator(NetworkSimulator::instant())
        .build()
        .unwrap_or_else(|e| panic!("context: {e}"))
}

/// Full application router over a fixture context.
#[must_use]
pub fn fixture_app(overrides: &[(&str, &str)]) -> Router {
    let config = config_with(overrides);
    let context = fixture_context(&config);
    vitrina_storefront::routes::app(AppState::with_context(config, context))
}

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap_or_else(|e| panic!("bind: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("local_addr: {e}"));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}
