use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;
use vitrina_core::{
    CartId, CurrencyCode, ItemId, OrderId, OrderStatus, PaymentMethodId, SellerId, ShipmentId,
    ShippingServiceId, SiteId, VariationId,
};

use super::{FixtureBackend, FixtureData};
use crate::marketplace::{
    AcceptedPaymentMethods, AppliedCoupon, BuyerProtection, Cart, CartItem, CartItemShipping,
    CartShippingOption, CartSummary, Checkout, CheckoutPayment, CheckoutRequest, CheckoutShipping,
    CouponKind, Item, Order, OrderItem, OrderParty, OrderPayment, OrderRequest, OrderShipping,
    OrderedItem, PayerCost, PaymentMethod, PaymentRequest, PaymentValidation,
    PaymentValidationRequest, PickupPoint, PickupPoints, ShipmentTracking, ShippingModes,
    ShippingOption, ShippingPromise, StatusDetail, StockInfo, ZipCodeInfo,
};
use crate::services::{
    Payload, PaymentService, PurchaseService, ServiceError, ServiceResult, ShippingService,
};

/// Unit price used for carts holding a listing the fixtures do not know.
const FALLBACK_UNIT_PRICE: i64 = 4_899_000;

/// Hours before an untouched cart expires.
const CART_TTL_HOURS: i64 = 24;

const MAX_PICKUP_POINTS: usize = 10;

/// Coupons the fixture checkout accepts.
fn coupon(code: &str) -> Option<AppliedCoupon> {
    let (kind, discount, description) = match code {
        "WELCOME10" => (CouponKind::Percentage, Decimal::new(10, 2), "10% de descuento"),
        "SAVE50000" => (CouponKind::Fixed, Decimal::from(50_000), "Descuento de $50,000"),
        "FREESHIP" => (CouponKind::FreeShipping, Decimal::ZERO, "Envío gratis"),
        _ => return None,
    };
    Some(AppliedCoupon {
        id: code.to_owned(),
        kind,
        discount,
        description: description.to_owned(),
        amount: if kind == CouponKind::Fixed { discount } else { Decimal::ZERO },
    })
}

fn short_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Cart line for `quantity` units of `id`, priced from the listing when known.
fn cart_line(listing: Option<&Item>, id: &ItemId, quantity: u32) -> CartItem {
    let Some(listing) = listing else {
        return CartItem {
            id: id.clone(),
            quantity,
            unit_price: Decimal::from(FALLBACK_UNIT_PRICE),
            currency_id: Some(CurrencyCode::Cop),
            ..CartItem::default()
        };
    };
    CartItem {
        id: id.clone(),
        variation_id: None,
        quantity,
        unit_price: listing.price,
        currency_id: Some(CurrencyCode::parse_or_default(listing.currency_id.as_deref())),
        available_quantity: listing.available_quantity,
        condition: listing.condition,
        warranty: listing.warranty.clone(),
        shipping: listing.shipping.as_ref().map(|shipping| CartItemShipping {
            free_shipping: shipping.free_shipping,
            mode: shipping.mode.clone(),
        }),
    }
}

fn require_quantity(quantity: u32) -> Result<(), ServiceError> {
    if quantity == 0 {
        return Err(ServiceError::Validation("Quantity must be at least 1".to_owned()));
    }
    Ok(())
}

impl FixtureData {
    fn cart_mut(&mut self, id: &CartId) -> Result<&mut Cart, ServiceError> {
        self.carts
            .get_mut(id)
            .ok_or_else(|| ServiceError::not_found("Cart", id))
    }

    fn order_mut(&mut self, id: &OrderId) -> Result<&mut Order, ServiceError> {
        self.orders
            .get_mut(id)
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    fn site_method(&self, site: SiteId, id: &PaymentMethodId) -> Option<&PaymentMethod> {
        self.payment_methods
            .get(&site)
            .and_then(|methods| methods.iter().find(|method| &method.id == id))
    }
}

fn touch(cart: &mut Cart, now: DateTime<Utc>) {
    cart.recompute();
    cart.date_updated = Some(now);
}

#[async_trait]
impl PaymentService for FixtureBackend {
    #[instrument(skip(self), fields(seller_id = %seller))]
    async fn get_accepted_methods(&self, seller: SellerId) -> ServiceResult<AcceptedPaymentMethods> {
        self.simulator.call("payment", "get_accepted_methods").await?;
        let data = self.store.read().await;
        let user = data
            .user(seller)
            .ok_or_else(|| ServiceError::not_found("Seller", seller))?;
        let site = user.site_id.unwrap_or(self.site);
        let methods = data.payment_methods.get(&site).cloned().unwrap_or_default();
        Ok(Payload::ok(AcceptedPaymentMethods::group(methods)))
    }

    #[instrument(skip(self))]
    async fn get_site_methods(&self, site: SiteId) -> ServiceResult<Vec<PaymentMethod>> {
        self.simulator.call("payment", "get_site_methods").await?;
        let methods = self
            .store
            .read()
            .await
            .payment_methods
            .get(&site)
            .cloned()
            .unwrap_or_default();
        Ok(Payload::ok(methods))
    }

    #[instrument(skip(self), fields(method = %method))]
    async fn get_installments(
        &self,
        amount: Decimal,
        method: &PaymentMethodId,
        site: SiteId,
    ) -> ServiceResult<Vec<PayerCost>> {
        self.simulator.call("payment", "get_installments").await?;
        let data = self.store.read().await;
        let found = data
            .site_method(site, method)
            .ok_or_else(|| ServiceError::not_found("Payment method", method))?;
        let costs = found
            .installments
            .iter()
            .map(|plan| PayerCost::quote(amount, plan, site.currency()))
            .collect();
        Ok(Payload::ok(costs))
    }

    #[instrument(skip(self), fields(method = %method))]
    async fn get_method(&self, method: &PaymentMethodId, site: SiteId) -> ServiceResult<PaymentMethod> {
        self.simulator.call("payment", "get_method").await?;
        self.store
            .read()
            .await
            .site_method(site, method)
            .cloned()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Payment method", method))
    }

    #[instrument(skip(self, request), fields(method = %request.payment_method_id))]
    async fn validate_payment(&self, request: &PaymentValidationRequest) -> ServiceResult<PaymentValidation> {
        self.simulator.call("payment", "validate_payment").await?;
        let data = self.store.read().await;
        let mut errors = Vec::new();

        if request.amount <= Decimal::ZERO {
            errors.push("Amount must be greater than zero".to_owned());
        }
        match data.site_method(self.site, &request.payment_method_id) {
            None => errors.push(format!(
                "Payment method {} is not available",
                request.payment_method_id
            )),
            Some(method) => {
                let installments = request.installments.unwrap_or(1);
                let offered = method.installments.is_empty()
                    || method.installments.iter().any(|plan| plan.installments == installments);
                if !offered {
                    errors.push(format!("{installments} installments are not available"));
                }
            }
        }

        Ok(Payload::ok(PaymentValidation {
            valid: errors.is_empty(),
            payment_method_id: request.payment_method_id.clone(),
            errors,
        }))
    }
}

#[async_trait]
impl PurchaseService for FixtureBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_stock_info(&self, item: &ItemId, variation: Option<&VariationId>) -> ServiceResult<StockInfo> {
        self.simulator.call("purchase", "get_stock_info").await?;
        let listing = self.item(item).await?;
        StockInfo::from_item(&listing, variation)
            .map(Payload::ok)
            .ok_or_else(|| {
                ServiceError::not_found("Variation", variation.map(ToString::to_string).unwrap_or_default())
            })
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn create_cart(&self, user: &str, item: &ItemId, quantity: u32) -> ServiceResult<Cart> {
        self.simulator.call("purchase", "create_cart").await?;
        require_quantity(quantity)?;

        let now = Utc::now();
        let mut data = self.store.write().await;
        let line = cart_line(data.item(item), item, quantity);
        let currency = line.currency_id.unwrap_or_default();
        let mut cart = Cart {
            id: CartId::new(short_id("cart")),
            site_id: Some(self.site),
            buyer_id: user.to_owned(),
            date_created: Some(now),
            date_updated: Some(now),
            expiration_date: Some(now + Duration::hours(CART_TTL_HOURS)),
            items: vec![line],
            coupons: Vec::new(),
            summary: CartSummary {
                currency_id: Some(currency),
                ..CartSummary::default()
            },
            shipping_options: vec![CartShippingOption {
                id: ShippingServiceId::new("mercadoenvios_flex"),
                name: "Mercado Envíos Flex".to_owned(),
                cost: Decimal::ZERO,
                estimated_delivery: Some((now + Duration::days(2)).date_naive()),
            }],
        };
        cart.recompute();
        data.carts.insert(cart.id.clone(), cart.clone());

        info!(cart_id = %cart.id, "Cart created");
        Ok(Payload::ok(cart))
    }

    #[instrument(skip(self), fields(cart_id = %id))]
    async fn get_cart(&self, id: &CartId) -> ServiceResult<Cart> {
        self.simulator.call("purchase", "get_cart").await?;
        self.store
            .read()
            .await
            .carts
            .get(id)
            .cloned()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Cart", id))
    }

    #[instrument(skip(self), fields(cart_id = %cart, item_id = %item))]
    async fn add_cart_item(&self, cart: &CartId, item: &ItemId, quantity: u32) -> ServiceResult<Cart> {
        self.simulator.call("purchase", "add_cart_item").await?;
        require_quantity(quantity)?;

        let mut data = self.store.write().await;
        let line = cart_line(data.item(item), item, quantity);
        let stored = data.cart_mut(cart)?;
        match stored.item_mut(item) {
            Some(existing) => existing.quantity += quantity,
            None => stored.items.push(line),
        }
        touch(stored, Utc::now());
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self), fields(cart_id = %cart, item_id = %item))]
    async fn update_cart_item(&self, cart: &CartId, item: &ItemId, quantity: u32) -> ServiceResult<Cart> {
        self.simulator.call("purchase", "update_cart_item").await?;
        require_quantity(quantity)?;

        let mut data = self.store.write().await;
        let stored = data.cart_mut(cart)?;
        let line = stored
            .item_mut(item)
            .ok_or_else(|| ServiceError::not_found("Cart item", item))?;
        line.quantity = quantity;
        touch(stored, Utc::now());
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self), fields(cart_id = %cart, item_id = %item))]
    async fn remove_cart_item(&self, cart: &CartId, item: &ItemId) -> ServiceResult<Cart> {
        self.simulator.call("purchase", "remove_cart_item").await?;
        let mut data = self.store.write().await;
        let stored = data.cart_mut(cart)?;
        stored.items.retain(|line| &line.id != item);
        touch(stored, Utc::now());
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self), fields(cart_id = %cart))]
    async fn apply_coupon(&self, cart: &CartId, code: &str) -> ServiceResult<Cart> {
        self.simulator.call("purchase", "apply_coupon").await?;
        let mut data = self.store.write().await;
        let stored = data.cart_mut(cart)?;
        let applied = coupon(code)
            .ok_or_else(|| ServiceError::Validation(format!("Coupon {code} is not valid")))?;
        if applied.kind == CouponKind::FreeShipping {
            stored.summary.shipping_cost = Decimal::ZERO;
        }
        // One coupon per cart; a new code replaces the previous one.
        stored.coupons = vec![applied];
        touch(stored, Utc::now());
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    async fn initiate_checkout(&self, request: &CheckoutRequest) -> ServiceResult<Checkout> {
        self.simulator.call("purchase", "initiate_checkout").await?;
        let data = self.store.read().await;
        let cart = data
            .carts
            .get(&request.cart_id)
            .ok_or_else(|| ServiceError::not_found("Cart", &request.cart_id))?;
        if cart.items.is_empty() {
            return Err(ServiceError::Validation("Cart is empty".to_owned()));
        }
        let site = cart.site_id.unwrap_or(self.site);
        if data.site_method(site, &request.payment_method_id).is_none() {
            return Err(ServiceError::Validation(format!(
                "Payment method {} is not available",
                request.payment_method_id
            )));
        }

        let checkout_id = short_id("checkout");
        Ok(Payload::ok(Checkout {
            redirect_url: Some(format!(
                "https://www.mercadopago.com.co/checkout/v1/redirect?pref_id={checkout_id}"
            )),
            checkout_id,
            status: "pending".to_owned(),
            total_amount: cart.summary.total_amount_with_shipping,
            payment_info: Some(CheckoutPayment {
                payment_method_id: request.payment_method_id.clone(),
                currency_id: cart.summary.currency_id,
            }),
            shipping_info: Some(CheckoutShipping {
                shipping_address_id: request.shipping_address_id.clone(),
                cost: cart.summary.shipping_cost,
            }),
        }))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_buyer_protection(&self, item: &ItemId) -> ServiceResult<BuyerProtection> {
        self.simulator.call("purchase", "get_buyer_protection").await?;
        self.item(item).await?;
        Ok(Payload::ok(BuyerProtection::standard()))
    }

    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    async fn create_order(&self, request: &OrderRequest) -> ServiceResult<Order> {
        self.simulator.call("purchase", "create_order").await?;
        let now = Utc::now();
        let mut data = self.store.write().await;
        let cart = data
            .carts
            .get(&request.cart_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Cart", &request.cart_id))?;

        let order_items = cart
            .items
            .iter()
            .map(|line| {
                let listing = data.item(&line.id);
                OrderItem {
                    item: OrderedItem {
                        id: line.id.clone(),
                        title: listing
                            .map_or_else(|| format!("Product {}", line.id), |l| l.title.clone()),
                        category_id: listing.map(|l| l.category_id.to_string()),
                        condition: line.condition,
                        warranty: line.warranty.clone(),
                    },
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    full_unit_price: line.unit_price,
                    currency_id: line.currency_id,
                }
            })
            .collect();
        let seller = cart
            .items
            .first()
            .and_then(|line| data.item(&line.id))
            .and_then(|listing| data.user(listing.seller_id))
            .map(|user| OrderParty {
                id: user.id.to_string(),
                nickname: user.nickname.clone(),
            });

        let order = Order {
            id: OrderId::new(short_id("order")),
            date_created: Some(now),
            date_closed: None,
            last_updated: Some(now),
            status: OrderStatus::Confirmed,
            status_detail: Some(StatusDetail::new("payment_pending", "Esperando confirmación de pago")),
            currency_id: cart.summary.currency_id,
            order_items,
            total_amount: cart.summary.total_amount,
            total_amount_with_shipping: cart.summary.total_amount_with_shipping,
            paid_amount: Decimal::ZERO,
            shipping: Some(OrderShipping {
                id: ShipmentId::new(short_id("shipping")),
                status: "pending".to_owned(),
                cost: cart.summary.shipping_cost,
                currency_id: cart.summary.currency_id,
                estimated_delivery: None,
            }),
            payments: Vec::new(),
            buyer: Some(OrderParty {
                id: cart.buyer_id.clone(),
                nickname: "BUYER_USER".to_owned(),
            }),
            seller,
        };
        data.orders.insert(order.id.clone(), order.clone());

        info!(order_id = %order.id, "Order created");
        Ok(Payload::ok(order))
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> ServiceResult<Order> {
        self.simulator.call("purchase", "get_order").await?;
        self.store
            .read()
            .await
            .orders
            .get(id)
            .cloned()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    #[instrument(skip(self, payment), fields(order_id = %order, method = %payment.payment_method_id))]
    async fn add_payment(&self, order: &OrderId, payment: &PaymentRequest) -> ServiceResult<Order> {
        self.simulator.call("purchase", "add_payment").await?;
        if payment.amount <= Decimal::ZERO {
            return Err(ServiceError::Validation("Amount must be greater than zero".to_owned()));
        }

        let now = Utc::now();
        let mut data = self.store.write().await;
        let stored = data.order_mut(order)?;
        let record = OrderPayment {
            id: short_id("payment"),
            order_id: Some(order.clone()),
            status: payment.status.clone().unwrap_or_else(|| "pending".to_owned()),
            status_detail: Some(
                payment
                    .status_detail
                    .clone()
                    .unwrap_or_else(|| "pending_payment".to_owned()),
            ),
            currency_id: stored.currency_id,
            payment_method_id: Some(payment.payment_method_id.clone()),
            payment_type: payment.payment_type.clone(),
            installments: payment.installments.unwrap_or(1),
            transaction_amount: payment.amount,
            date_created: Some(now),
        };
        let approved = record.status == "approved";
        stored.payments.push(record);
        stored.last_updated = Some(now);

        if approved {
            stored.paid_amount = payment.amount;
            stored.transition(
                OrderStatus::Paid,
                StatusDetail::new("payment_confirmed", "Pago confirmado"),
                now,
            );
        }
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self, detail), fields(order_id = %id))]
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        detail: StatusDetail,
    ) -> ServiceResult<Order> {
        self.simulator.call("purchase", "update_order_status").await?;
        let mut data = self.store.write().await;
        let stored = data.order_mut(id)?;
        stored.transition(status, detail, Utc::now());
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn cancel_order(&self, id: &OrderId, reason: Option<&str>) -> ServiceResult<Order> {
        self.simulator.call("purchase", "cancel_order").await?;
        let mut data = self.store.write().await;
        let stored = data.order_mut(id)?;
        stored.transition(
            OrderStatus::Cancelled,
            StatusDetail::new("user_cancelled", reason.unwrap_or("Cancelado por el usuario")),
            Utc::now(),
        );
        Ok(Payload::ok(stored.clone()))
    }

    #[instrument(skip(self), fields(shipment_id = %id))]
    async fn get_shipment(&self, id: &ShipmentId) -> ServiceResult<ShipmentTracking> {
        self.simulator.call("purchase", "get_shipment").await?;
        Ok(Payload::ok(self.tracking(id).await))
    }
}

impl FixtureBackend {
    /// Every shipment reports the fixture tracking history under its own id.
    async fn tracking(&self, id: &ShipmentId) -> ShipmentTracking {
        let mut tracking = self.store.read().await.tracking.clone();
        tracking.tracking_number = Some(format!("ME{id}CO"));
        tracking.id = id.clone();
        tracking
    }
}

#[async_trait]
impl ShippingService for FixtureBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_shipping_options(
        &self,
        item: &ItemId,
        _zip_code: &str,
        _quantity: u32,
    ) -> ServiceResult<Vec<ShippingOption>> {
        self.simulator.call("shipping", "get_shipping_options").await?;
        let data = self.store.read().await;
        if data.item(item).is_none() {
            return Err(ServiceError::not_found("Product", item));
        }
        let options = data.shipping_options.get(item).cloned().unwrap_or_default();
        Ok(Payload::ok(options))
    }

    #[instrument(skip(self))]
    async fn get_zip_code_info(&self, country: &str, zip_code: &str) -> ServiceResult<ZipCodeInfo> {
        self.simulator.call("shipping", "get_zip_code_info").await?;
        let data = self.store.read().await;
        if let Some(info) = data.zip_codes.iter().find(|info| info.zip_code == zip_code) {
            return Ok(Payload::ok(info.clone()));
        }
        // Unlisted zip in a known country: the country is all we can vouch for.
        data.zip_codes
            .iter()
            .any(|info| info.country_id.as_deref() == Some(country))
            .then(|| ZipCodeInfo {
                zip_code: zip_code.to_owned(),
                country_id: Some(country.to_owned()),
                ..ZipCodeInfo::default()
            })
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Zip code", zip_code))
    }

    /// Promise of the option that delivers first.
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_shipping_promise(&self, item: &ItemId, zip_code: Option<&str>) -> ServiceResult<ShippingPromise> {
        self.simulator.call("shipping", "get_shipping_promise").await?;
        let data = self.store.read().await;
        let listing = data.item(item).ok_or_else(|| ServiceError::not_found("Product", item))?;
        let fastest = data
            .shipping_options
            .get(item)
            .into_iter()
            .flatten()
            .filter(|option| option.delivery_date().is_some())
            .min_by_key(|option| option.delivery_date());

        Ok(Payload::ok(ShippingPromise {
            item_id: item.clone(),
            zip_code: zip_code.map(str::to_owned),
            shipping_option_id: fastest.map(|option| option.id.clone()),
            free_shipping: fastest.map_or_else(
                || listing.shipping.as_ref().is_some_and(|s| s.free_shipping),
                |option| option.free_shipping.flag,
            ),
            estimated_delivery: fastest.and_then(|option| option.estimated_delivery.clone()),
        }))
    }

    #[instrument(skip(self), fields(service = %service))]
    async fn get_pickup_points(
        &self,
        service: &ShippingServiceId,
        zip_code: &str,
    ) -> ServiceResult<PickupPoints> {
        self.simulator.call("shipping", "get_pickup_points").await?;
        let data = self.store.read().await;
        let mut points: Vec<PickupPoint> = Vec::new();
        let offered = data
            .shipping_options
            .values()
            .flatten()
            .filter(|option| &option.id == service)
            .flat_map(ShippingOption::pickup_points);
        for point in offered {
            if points.len() == MAX_PICKUP_POINTS {
                break;
            }
            if !points.iter().any(|p| p.id == point.id) {
                points.push(point.clone());
            }
        }
        Ok(Payload::ok(PickupPoints {
            zip_code: zip_code.to_owned(),
            site_id: Some(self.site),
            pickup_points: points,
        }))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_shipping_modes(&self, item: &ItemId) -> ServiceResult<ShippingModes> {
        self.simulator.call("shipping", "get_shipping_modes").await?;
        let listing = self.item(item).await?;
        Ok(Payload::ok(ShippingModes::from(listing.shipping.as_ref())))
    }

    #[instrument(skip(self), fields(shipment_id = %id))]
    async fn track_shipment(&self, id: &ShipmentId) -> ServiceResult<ShipmentTracking> {
        self.simulator.call("shipping", "track_shipment").await?;
        Ok(Payload::ok(self.tracking(id).await))
    }
}
