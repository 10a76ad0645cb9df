use async_trait::async_trait;
use vitrina_core::{CartId, ItemId, OrderId, OrderStatus, ShipmentId, VariationId};

use super::ServiceResult;
use crate::marketplace::{
    BuyerProtection, Cart, Checkout, CheckoutRequest, Order, OrderRequest, PaymentRequest,
    ShipmentTracking, StatusDetail, StockInfo,
};

/// Stock, carts, checkout and orders.
#[async_trait]
pub trait PurchaseService: Send + Sync {
    async fn get_stock_info(&self, item: &ItemId, variation: Option<&VariationId>) -> ServiceResult<StockInfo>;

    async fn create_cart(&self, user: &str, item: &ItemId, quantity: u32) -> ServiceResult<Cart>;

    async fn get_cart(&self, id: &CartId) -> ServiceResult<Cart>;

    /// Add `quantity` units; an item already in the cart has its quantity raised.
    async fn add_cart_item(&self, cart: &CartId, item: &ItemId, quantity: u32) -> ServiceResult<Cart>;

    async fn update_cart_item(&self, cart: &CartId, item: &ItemId, quantity: u32) -> ServiceResult<Cart>;

    async fn remove_cart_item(&self, cart: &CartId, item: &ItemId) -> ServiceResult<Cart>;

    async fn apply_coupon(&self, cart: &CartId, code: &str) -> ServiceResult<Cart>;

    async fn initiate_checkout(&self, request: &CheckoutRequest) -> ServiceResult<Checkout>;

    async fn get_buyer_protection(&self, item: &ItemId) -> ServiceResult<BuyerProtection>;

    async fn create_order(&self, request: &OrderRequest) -> ServiceResult<Order>;

    async fn get_order(&self, id: &OrderId) -> ServiceResult<Order>;

    async fn add_payment(&self, order: &OrderId, payment: &PaymentRequest) -> ServiceResult<Order>;

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        detail: StatusDetail,
    ) -> ServiceResult<Order>;

    async fn cancel_order(&self, id: &OrderId, reason: Option<&str>) -> ServiceResult<Order>;

    async fn get_shipment(&self, id: &ShipmentId) -> ServiceResult<ShipmentTracking>;
}
