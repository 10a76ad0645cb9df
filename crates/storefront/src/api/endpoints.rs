//! Path builders for the marketplace REST API.
//!
//! Identifiers are percent-encoded so ids that contain `/` or spaces cannot
//! change the route.

use url::form_urlencoded::Serializer;
use vitrina_core::{
    CartId, CategoryId, ItemId, OrderId, PaymentMethodId, QuestionId, QuestionStatus, ReviewId,
    SellerId, ShipmentId, ShippingServiceId, SiteId, UserId,
};

use crate::marketplace::SearchOptions;

fn enc(segment: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(segment)
}

fn with_query<'a>(path: String, pairs: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut query = Serializer::new(String::new());
    for (key, value) in pairs {
        query.append_pair(key, &value);
    }
    let query = query.finish();
    if query.is_empty() { path } else { format!("{path}?{query}") }
}

// Items

#[must_use]
pub fn item(id: &ItemId) -> String {
    format!("/items/{}", enc(id.as_str()))
}

#[must_use]
pub fn item_description(id: &ItemId) -> String {
    format!("/items/{}/description", enc(id.as_str()))
}

#[must_use]
pub fn items(ids: &[ItemId]) -> String {
    let joined = ids.iter().map(ItemId::as_str).collect::<Vec<_>>().join(",");
    with_query("/items".to_owned(), [("ids", joined)])
}

#[must_use]
pub fn search(query: &str, options: &SearchOptions) -> String {
    let mut pairs = Vec::new();
    if !query.is_empty() {
        pairs.push(("q", query.to_owned()));
    }
    if let Some(category) = &options.category {
        pairs.push(("category", category.to_string()));
    }
    pairs.push(("limit", options.limit.to_string()));
    pairs.push(("offset", options.offset.to_string()));
    pairs.extend(options.extra.iter().map(|(k, v)| (k.as_str(), v.clone())));
    with_query(format!("/sites/{}/search", options.site.code()), pairs)
}

// Users

#[must_use]
pub fn user(id: SellerId) -> String {
    format!("/users/{id}")
}

#[must_use]
pub fn user_items(id: SellerId, limit: u32, offset: u32) -> String {
    with_query(
        format!("/users/{id}/items/search"),
        [("limit", limit.to_string()), ("offset", offset.to_string())],
    )
}

// Payments

#[must_use]
pub fn accepted_payment_methods(seller: SellerId) -> String {
    format!("/users/{seller}/accepted_payment_methods")
}

#[must_use]
pub fn site_payment_methods(site: SiteId) -> String {
    format!("/sites/{}/payment_methods", site.code())
}

#[must_use]
pub fn installments(site: SiteId, amount: &str, method: &PaymentMethodId) -> String {
    with_query(
        format!("/sites/{}/payment_methods/installments", site.code()),
        [("amount", amount.to_owned()), ("payment_method_id", method.to_string())],
    )
}

#[must_use]
pub fn payment_method(id: &PaymentMethodId) -> String {
    format!("/payment_methods/{}", enc(id.as_str()))
}

pub const VALIDATE_PAYMENT: &str = "/payments/validate";

// Questions

#[must_use]
pub fn item_questions(item: &ItemId, status: Option<QuestionStatus>, limit: u32, offset: u32) -> String {
    let mut pairs = vec![
        ("item", item.to_string()),
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
        ("api_version", "4".to_owned()),
    ];
    if let Some(status) = status {
        pairs.push(("status", status.to_string()));
    }
    with_query("/questions/search".to_owned(), pairs)
}

#[must_use]
pub fn question(id: QuestionId) -> String {
    format!("/questions/{id}")
}

#[must_use]
pub fn delete_question(id: QuestionId, user: UserId) -> String {
    with_query(format!("/questions/{id}"), [("user_id", user.to_string())])
}

#[must_use]
pub fn seller_questions(seller: SellerId, status: Option<QuestionStatus>) -> String {
    let mut pairs = vec![("seller", seller.to_string())];
    if let Some(status) = status {
        pairs.push(("status", status.to_string()));
    }
    with_query("/questions/search".to_owned(), pairs)
}

pub const QUESTIONS: &str = "/questions";
pub const ANSWERS: &str = "/answers";

// Reviews

#[must_use]
pub fn item_reviews(item: &ItemId, limit: u32, offset: u32) -> String {
    with_query(
        format!("/reviews/item/{}", enc(item.as_str())),
        [("limit", limit.to_string()), ("offset", offset.to_string())],
    )
}

#[must_use]
pub fn review(id: &ReviewId) -> String {
    format!("/reviews/{}", enc(id.as_str()))
}

#[must_use]
pub fn review_vote(id: &ReviewId, helpful: bool) -> String {
    let vote = if helpful { "helpful" } else { "not_helpful" };
    format!("/reviews/{}/{vote}", enc(id.as_str()))
}

#[must_use]
pub fn review_report(id: &ReviewId) -> String {
    format!("/reviews/{}/report", enc(id.as_str()))
}

#[must_use]
pub fn review_attributes(item: &ItemId) -> String {
    format!("/reviews/item/{}/attributes", enc(item.as_str()))
}

#[must_use]
pub fn seller_reviews(seller: SellerId) -> String {
    format!("/reviews/seller/{seller}")
}

pub const REVIEWS: &str = "/reviews";

// Categories

#[must_use]
pub fn category(id: &CategoryId) -> String {
    format!("/categories/{}", enc(id.as_str()))
}

#[must_use]
pub fn category_attributes(id: &CategoryId) -> String {
    format!("/categories/{}/attributes", enc(id.as_str()))
}

#[must_use]
pub fn site_categories(site: SiteId) -> String {
    format!("/sites/{}/categories", site.code())
}

#[must_use]
pub fn category_predictor(site: SiteId, title: &str) -> String {
    with_query(
        format!("/sites/{}/category_predictor/predict", site.code()),
        [("q", title.to_owned())],
    )
}

#[must_use]
pub fn trends(site: SiteId) -> String {
    format!("/sites/{}/trends", site.code())
}

// Purchase

pub const CARTS: &str = "/carts";
pub const CHECKOUT: &str = "/checkout";
pub const ORDERS: &str = "/orders";

#[must_use]
pub fn cart(id: &CartId) -> String {
    format!("/carts/{}", enc(id.as_str()))
}

#[must_use]
pub fn cart_items(id: &CartId) -> String {
    format!("/carts/{}/items", enc(id.as_str()))
}

#[must_use]
pub fn cart_item(id: &CartId, item: &ItemId) -> String {
    format!("/carts/{}/items/{}", enc(id.as_str()), enc(item.as_str()))
}

#[must_use]
pub fn cart_coupons(id: &CartId) -> String {
    format!("/carts/{}/coupons", enc(id.as_str()))
}

#[must_use]
pub fn buyer_protection(item: &ItemId) -> String {
    format!("/items/{}/buyer_protection", enc(item.as_str()))
}

#[must_use]
pub fn order(id: &OrderId) -> String {
    format!("/orders/{}", enc(id.as_str()))
}

#[must_use]
pub fn order_payments(id: &OrderId) -> String {
    format!("/orders/{}/payments", enc(id.as_str()))
}

#[must_use]
pub fn order_status(id: &OrderId) -> String {
    format!("/orders/{}/status", enc(id.as_str()))
}

#[must_use]
pub fn cancel_order(id: &OrderId) -> String {
    format!("/orders/{}/cancel", enc(id.as_str()))
}

#[must_use]
pub fn shipment(id: &ShipmentId) -> String {
    format!("/shipments/{}", enc(id.as_str()))
}

// Shipping

#[must_use]
pub fn shipping_options(item: &ItemId, zip_code: &str, quantity: u32) -> String {
    with_query(
        format!("/items/{}/shipping_options", enc(item.as_str())),
        [("zip_code", zip_code.to_owned()), ("quantity", quantity.to_string())],
    )
}

#[must_use]
pub fn zip_code(country: &str, zip_code: &str) -> String {
    format!("/countries/{}/zip_codes/{}", enc(country), enc(zip_code))
}

#[must_use]
pub fn shipping_promise(item: &ItemId, zip_code: Option<&str>) -> String {
    with_query(
        format!("/items/{}/shipping_promise", enc(item.as_str())),
        zip_code.map(|zip| ("zip_code", zip.to_owned())),
    )
}

#[must_use]
pub fn drop_off_points(service: &ShippingServiceId, zip_code: &str) -> String {
    with_query(
        format!("/shipping_services/{}/drop_off_points", enc(service.as_str())),
        [("zip_code", zip_code.to_owned())],
    )
}
