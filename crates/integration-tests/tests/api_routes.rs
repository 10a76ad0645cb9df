//! Integration tests for the JSON API.
//!
//! Requests go through the full router (fallback, tracing and CORS layers)
//! with `tower::ServiceExt::oneshot`; no socket is opened.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use vitrina_integration_tests::fixture_app;

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// =============================================================================
// Health and Fallback
// =============================================================================

#[tokio::test]
async fn test_health_reports_data_source() {
    let (status, body) = get(fixture_app(&[]), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "dataSource": "fixture" }));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = get(fixture_app(&[]), "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "route not found");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_info() {
    let (status, body) = get(fixture_app(&[]), "/api/products/MCO123456789").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "MCO123456789");
    assert_eq!(body["availableQuantity"], 45);
    assert_eq!(body["images"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_product_maps_to_404() {
    let (status, body) = get(fixture_app(&[]), "/api/products/MCO000000000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Product with id MCO000000000 not found")
    );
}

#[tokio::test]
async fn test_product_page_follows_feature_flags() {
    let app = fixture_app(&[("ENABLE_RECOMMENDATIONS", "true")]);
    let (status, body) = get(app, "/api/products/MCO123456789/page").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reviews"].is_object());
    assert!(body["questions"].is_object());
    assert!(body["related"].is_array());

    let app = fixture_app(&[
        ("ENABLE_REVIEWS", "false"),
        ("ENABLE_QUESTIONS", "false"),
        ("ENABLE_RECOMMENDATIONS", "false"),
    ]);
    let (status, body) = get(app, "/api/products/MCO123456789/page").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reviews"].is_null());
    assert!(body["questions"].is_null());
    assert!(body["related"].is_null());
}

#[tokio::test]
async fn test_product_page_uses_default_limit() {
    let app = fixture_app(&[("DEFAULT_LIMIT", "2")]);
    let (status, body) = get(app, "/api/products/MCO123456789/page").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"]["limit"], 2);
    assert_eq!(body["questions"]["questions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_shipping_requires_zip() {
    let (status, _) = get(fixture_app(&[]), "/api/products/MCO123456789/shipping").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(
        fixture_app(&[]),
        "/api/products/MCO123456789/shipping?zip=110111&quantity=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["options"].as_array().unwrap().is_empty());
    assert_eq!(body["summary"]["hasFreeShipping"], true);
}

#[tokio::test]
async fn test_total_cost_rejects_quantity_above_stock() {
    let (status, body) = get(fixture_app(&[]), "/api/products/MCO123456789/total?quantity=46").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Cantidad no disponible en stock")
    );
}

// =============================================================================
// Reviews and Questions
// =============================================================================

#[tokio::test]
async fn test_reviews_with_rating_filter() {
    let (status, body) = get(fixture_app(&[]), "/api/products/MCO123456789/reviews?rating=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["insights"]["recommendationRate"], 100);
}

#[tokio::test]
async fn test_create_review_then_list_it() {
    let app = fixture_app(&[]);
    let draft = json!({
        "rating": 4,
        "title": "Buen equipo",
        "content": "Cumple con lo esperado",
        "user_id": "buyer_99"
    });

    let (status, created) = post(app.clone(), "/api/products/MCO123456789/reviews", &draft).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["rating"], 4);
    assert_eq!(created["title"], "Buen equipo");

    let (_, listed) = get(app, "/api/products/MCO123456789/reviews?limit=50").await;
    assert_eq!(listed["stats"]["total"], 6);
}

#[tokio::test]
async fn test_invalid_review_is_bad_request() {
    let draft = json!({ "rating": 6, "title": "Seis", "user_id": "buyer_99" });
    let (status, body) = post(fixture_app(&[]), "/api/products/MCO123456789/reviews", &draft).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_disabled_reviews_are_not_found() {
    let app = fixture_app(&[("ENABLE_REVIEWS", "false")]);
    let (status, _) = get(app, "/api/products/MCO123456789/reviews").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ask_question() {
    let app = fixture_app(&[]);
    let question = json!({ "text": "¿Tiene garantía oficial?", "user_id": 555 });

    let (status, body) = post(app.clone(), "/api/products/MCO123456789/questions", &question).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Pregunta enviada correctamente");

    let (status, listed) = get(app, "/api/products/MCO123456789/questions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["summary"]["pendingQuestions"], 2);
}

// =============================================================================
// Sellers and Categories
// =============================================================================

#[tokio::test]
async fn test_seller_info_and_unknown_seller() {
    let (status, body) = get(fixture_app(&[]), "/api/sellers/123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 123_456);

    let (status, _) = get(fixture_app(&[]), "/api/sellers/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_filters() {
    let (status, body) = get(fixture_app(&[]), "/api/categories/MCO1055/filters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filterGroups"]["primary"][0]["id"], "BRAND");
    assert_eq!(body["filterGroups"]["primary"][1]["id"], "MODEL");
}

// =============================================================================
// Cart and Checkout
// =============================================================================

#[tokio::test]
async fn test_cart_then_checkout() {
    let app = fixture_app(&[]);
    let request = json!({ "buyer_id": "buyer_1", "item_id": "MCO123456789", "quantity": 2 });

    let (status, cart) = post(app.clone(), "/api/cart", &request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cart["success"], true);
    assert_eq!(cart["cartInfo"]["totalItems"], 2);

    let checkout = json!({
        "cart_id": cart["cartInfo"]["cartId"],
        "payment_method_id": "credit_card"
    });
    let (status, body) = post(app, "/api/checkout", &checkout).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["nextSteps"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_zero_quantity_cart_is_bad_request() {
    let request = json!({ "buyer_id": "buyer_1", "item_id": "MCO123456789", "quantity": 0 });
    let (status, _) = post(fixture_app(&[]), "/api/cart", &request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
