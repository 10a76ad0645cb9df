use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::instrument;
use vitrina_core::{
    CartId, ItemId, OrderId, OrderStatus, PaymentMethodId, SellerId, ShipmentId,
    ShippingServiceId, SiteId, VariationId,
};

use super::LiveBackend;
use crate::api::endpoints;
use crate::marketplace::{
    AcceptedPaymentMethods, BuyerProtection, Cart, Checkout, CheckoutRequest, InstallmentQuote,
    Order, OrderRequest, PayerCost, PaymentMethod, PaymentRequest, PaymentValidation,
    PaymentValidationRequest, PickupPoint, PickupPoints, ShipmentTracking, ShippingModes,
    ShippingOption, ShippingOptionsResponse, ShippingPromise, StatusDetail, StockInfo, ZipCodeInfo,
};
use crate::services::{
    NotFoundExt, Payload, PaymentService, PurchaseService, ServiceError, ServiceResult,
    ShippingService,
};

#[async_trait]
impl PaymentService for LiveBackend {
    #[instrument(skip(self), fields(seller_id = %seller))]
    async fn get_accepted_methods(&self, seller: SellerId) -> ServiceResult<AcceptedPaymentMethods> {
        let methods: Vec<PaymentMethod> = self
            .client
            .get(&endpoints::accepted_payment_methods(seller))
            .await
            .or_not_found("Seller", seller)?;
        Ok(Payload::ok(AcceptedPaymentMethods::group(methods)))
    }

    #[instrument(skip(self))]
    async fn get_site_methods(&self, site: SiteId) -> ServiceResult<Vec<PaymentMethod>> {
        let methods = self.client.get(&endpoints::site_payment_methods(site)).await?;
        Ok(Payload::ok(methods))
    }

    #[instrument(skip(self), fields(method = %method))]
    async fn get_installments(
        &self,
        amount: Decimal,
        method: &PaymentMethodId,
        site: SiteId,
    ) -> ServiceResult<Vec<PayerCost>> {
        let quotes: Vec<InstallmentQuote> = self
            .client
            .get(&endpoints::installments(site, &amount.to_string(), method))
            .await
            .or_not_found("Payment method", method)?;
        let quote = match quotes.iter().position(|quote| &quote.payment_method_id == method) {
            Some(index) => quotes.into_iter().nth(index),
            None => quotes.into_iter().next(),
        };
        let mut costs = quote.map(|quote| quote.payer_costs).unwrap_or_default();
        for cost in &mut costs {
            cost.currency_id.get_or_insert(site.currency());
        }
        Ok(Payload::ok(costs))
    }

    #[instrument(skip(self), fields(method = %method))]
    async fn get_method(&self, method: &PaymentMethodId, _site: SiteId) -> ServiceResult<PaymentMethod> {
        self.client
            .get(&endpoints::payment_method(method))
            .await
            .or_not_found("Payment method", method)
            .map(Payload::ok)
    }

    #[instrument(skip(self, request), fields(method = %request.payment_method_id))]
    async fn validate_payment(&self, request: &PaymentValidationRequest) -> ServiceResult<PaymentValidation> {
        let validation = self.client.post(endpoints::VALIDATE_PAYMENT, request).await?;
        Ok(Payload::ok(validation))
    }
}

#[async_trait]
impl PurchaseService for LiveBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_stock_info(&self, item: &ItemId, variation: Option<&VariationId>) -> ServiceResult<StockInfo> {
        let listing = self.fetch_item(item).await?;
        StockInfo::from_item(&listing, variation)
            .map(Payload::ok)
            .ok_or_else(|| {
                let id = variation.map(VariationId::as_str).unwrap_or_default();
                ServiceError::not_found("Variation", id)
            })
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn create_cart(&self, user: &str, item: &ItemId, quantity: u32) -> ServiceResult<Cart> {
        let body = json!({ "buyer_id": user, "item_id": item, "quantity": quantity });
        let cart = self.client.post(endpoints::CARTS, &body).await?;
        Ok(Payload::ok(cart))
    }

    #[instrument(skip(self), fields(cart_id = %id))]
    async fn get_cart(&self, id: &CartId) -> ServiceResult<Cart> {
        self.client
            .get(&endpoints::cart(id))
            .await
            .or_not_found("Cart", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(cart_id = %cart, item_id = %item))]
    async fn add_cart_item(&self, cart: &CartId, item: &ItemId, quantity: u32) -> ServiceResult<Cart> {
        let body = json!({ "item_id": item, "quantity": quantity });
        self.client
            .post(&endpoints::cart_items(cart), &body)
            .await
            .or_not_found("Cart", cart)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(cart_id = %cart, item_id = %item))]
    async fn update_cart_item(&self, cart: &CartId, item: &ItemId, quantity: u32) -> ServiceResult<Cart> {
        let body = json!({ "quantity": quantity });
        self.client
            .put(&endpoints::cart_item(cart, item), &body)
            .await
            .or_not_found("Cart", cart)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(cart_id = %cart, item_id = %item))]
    async fn remove_cart_item(&self, cart: &CartId, item: &ItemId) -> ServiceResult<Cart> {
        self.client
            .delete(&endpoints::cart_item(cart, item))
            .await
            .or_not_found("Cart", cart)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(cart_id = %cart))]
    async fn apply_coupon(&self, cart: &CartId, code: &str) -> ServiceResult<Cart> {
        let body = json!({ "code": code });
        self.client
            .post(&endpoints::cart_coupons(cart), &body)
            .await
            .or_not_found("Cart", cart)
            .map(Payload::ok)
    }

    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    async fn initiate_checkout(&self, request: &CheckoutRequest) -> ServiceResult<Checkout> {
        self.client
            .post(endpoints::CHECKOUT, request)
            .await
            .or_not_found("Cart", &request.cart_id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_buyer_protection(&self, item: &ItemId) -> ServiceResult<BuyerProtection> {
        self.client
            .get(&endpoints::buyer_protection(item))
            .await
            .or_not_found("Product", item)
            .map(Payload::ok)
    }

    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    async fn create_order(&self, request: &OrderRequest) -> ServiceResult<Order> {
        self.client
            .post(endpoints::ORDERS, request)
            .await
            .or_not_found("Cart", &request.cart_id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> ServiceResult<Order> {
        self.client
            .get(&endpoints::order(id))
            .await
            .or_not_found("Order", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self, payment), fields(order_id = %order))]
    async fn add_payment(&self, order: &OrderId, payment: &PaymentRequest) -> ServiceResult<Order> {
        self.client
            .post(&endpoints::order_payments(order), payment)
            .await
            .or_not_found("Order", order)
            .map(Payload::ok)
    }

    #[instrument(skip(self, detail), fields(order_id = %id, ?status))]
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        detail: StatusDetail,
    ) -> ServiceResult<Order> {
        let body = json!({ "status": status, "status_detail": detail });
        self.client
            .put(&endpoints::order_status(id), &body)
            .await
            .or_not_found("Order", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn cancel_order(&self, id: &OrderId, reason: Option<&str>) -> ServiceResult<Order> {
        let body = json!({ "reason": reason });
        self.client
            .post(&endpoints::cancel_order(id), &body)
            .await
            .or_not_found("Order", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(shipment_id = %id))]
    async fn get_shipment(&self, id: &ShipmentId) -> ServiceResult<ShipmentTracking> {
        self.client
            .get(&endpoints::shipment(id))
            .await
            .or_not_found("Shipment", id)
            .map(Payload::ok)
    }
}

#[async_trait]
impl ShippingService for LiveBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_shipping_options(
        &self,
        item: &ItemId,
        zip_code: &str,
        quantity: u32,
    ) -> ServiceResult<Vec<ShippingOption>> {
        let response: ShippingOptionsResponse = self
            .client
            .get(&endpoints::shipping_options(item, zip_code, quantity))
            .await
            .or_not_found("Product", item)?;
        Ok(Payload::ok(response.options))
    }

    #[instrument(skip(self))]
    async fn get_zip_code_info(&self, country: &str, zip_code: &str) -> ServiceResult<ZipCodeInfo> {
        self.client
            .get(&endpoints::zip_code(country, zip_code))
            .await
            .or_not_found("Zip code", zip_code)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_shipping_promise(&self, item: &ItemId, zip_code: Option<&str>) -> ServiceResult<ShippingPromise> {
        self.client
            .get(&endpoints::shipping_promise(item, zip_code))
            .await
            .or_not_found("Product", item)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(service = %service))]
    async fn get_pickup_points(
        &self,
        service: &ShippingServiceId,
        zip_code: &str,
    ) -> ServiceResult<PickupPoints> {
        let points: Vec<PickupPoint> = self
            .client
            .get(&endpoints::drop_off_points(service, zip_code))
            .await
            .or_not_found("Shipping service", service)?;
        Ok(Payload::ok(PickupPoints {
            zip_code: zip_code.to_owned(),
            site_id: Some(self.site),
            pickup_points: points,
        }))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_shipping_modes(&self, item: &ItemId) -> ServiceResult<ShippingModes> {
        let listing = self.fetch_item(item).await?;
        Ok(Payload::ok(ShippingModes::from(listing.shipping.as_ref())))
    }

    #[instrument(skip(self), fields(shipment_id = %id))]
    async fn track_shipment(&self, id: &ShipmentId) -> ServiceResult<ShipmentTracking> {
        self.client
            .get(&endpoints::shipment(id))
            .await
            .or_not_found("Shipment", id)
            .map(Payload::ok)
    }
}
