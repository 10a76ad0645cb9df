use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{instrument, warn};
use vitrina_core::{
    CartId, CurrencyCode, ItemId, PaymentMethodId, ShippingServiceId, StockStatus, VariationId,
};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{
    BuyerProtection, Cart, CartRequest, Checkout, CheckoutRequest, ShippingOption, StockInfo,
};
use crate::services::ServiceResolver;

/// A shipping option with its delivery estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionView {
    pub id: ShippingServiceId,
    pub name: String,
    pub display_name: Option<String>,
    pub cost: Decimal,
    pub list_cost: Decimal,
    pub currency: CurrencyCode,
    pub free_shipping: bool,
    pub estimated_delivery: DeliveryWindow,
    pub speed_ranking: Option<u32>,
    pub pickup_points: usize,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryWindow {
    pub date: Option<DateTime<Utc>>,
    pub unit: Option<String>,
    /// Business days between dispatch and delivery, when the API sends it.
    pub offset_days: Option<u32>,
}

impl ShippingOptionView {
    /// Whole days from `now` until the estimated delivery; `None` without an
    /// estimate.
    #[must_use]
    pub fn days_until_delivery(&self, now: DateTime<Utc>) -> Option<i64> {
        self.estimated_delivery
            .date
            .map(|date| (date - now).num_days().max(0))
    }
}

impl From<&ShippingOption> for ShippingOptionView {
    fn from(option: &ShippingOption) -> Self {
        let estimate = option.estimated_delivery.clone().unwrap_or_default();
        Self {
            id: option.id.clone(),
            name: option.name.clone(),
            display_name: option.display_name.clone(),
            cost: option.cost,
            list_cost: option.list_cost,
            currency: option.currency_id.unwrap_or_default(),
            free_shipping: option.free_shipping.flag,
            estimated_delivery: DeliveryWindow {
                date: estimate.date,
                unit: estimate.unit,
                offset_days: estimate.offset.map(|offset| offset.date),
            },
            speed_ranking: option.speed_ranking,
            pickup_points: option.pickup_points().count(),
            tags: option.tags.clone(),
        }
    }
}

/// Price breakdown for buying `quantity` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalCost {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl TotalCost {
    #[must_use]
    pub fn new(unit_price: Decimal, quantity: u32, shipping: Decimal, taxes: Decimal, currency: CurrencyCode) -> Self {
        let subtotal = unit_price * Decimal::from(quantity);
        Self {
            subtotal,
            shipping,
            taxes,
            total: subtotal + shipping + taxes,
            currency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    pub available: u32,
    pub sold: u32,
    pub max_purchase_quantity: u32,
    pub stock_status: StockStatus,
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<&StockInfo> for StockView {
    fn from(stock: &StockInfo) -> Self {
        let max = if stock.max_purchase_quantity == 0 {
            stock.available_quantity
        } else {
            stock.max_purchase_quantity
        };
        Self {
            available: stock.available_quantity,
            sold: stock.sold_quantity,
            max_purchase_quantity: max,
            stock_status: StockStatus::from_quantity(stock.available_quantity),
            last_updated: stock.last_updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: CartId,
    pub buyer_id: String,
    pub items: Vec<CartLineView>,
    pub total_items: u32,
    pub total_amount: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub total_with_shipping: Decimal,
    pub currency: CurrencyCode,
    pub coupons: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub item_id: ItemId,
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            cart_id: cart.id.clone(),
            buyer_id: cart.buyer_id.clone(),
            items: cart
                .items
                .iter()
                .map(|item| CartLineView {
                    item_id: item.id.clone(),
                    variation_id: item.variation_id.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal(),
                })
                .collect(),
            total_items: cart.summary.total_items,
            total_amount: cart.summary.total_amount,
            shipping_cost: cart.summary.shipping_cost,
            discount_amount: cart.summary.discount_amount,
            total_with_shipping: cart.summary.total_amount_with_shipping,
            currency: cart.summary.currency_id.unwrap_or_default(),
            coupons: cart.coupons.iter().map(|coupon| coupon.id.clone()).collect(),
            expires_at: cart.expiration_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub checkout_id: String,
    pub redirect_url: Option<String>,
    pub status: String,
    pub total_amount: Decimal,
    pub payment_method_id: Option<PaymentMethodId>,
    pub shipping_cost: Option<Decimal>,
}

impl From<Checkout> for CheckoutView {
    fn from(checkout: Checkout) -> Self {
        Self {
            checkout_id: checkout.checkout_id,
            redirect_url: checkout.redirect_url,
            status: checkout.status,
            total_amount: checkout.total_amount,
            payment_method_id: checkout.payment_info.map(|info| info.payment_method_id),
            shipping_cost: checkout.shipping_info.map(|info| info.cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProtectionView {
    pub has_protection: bool,
    pub guarantees: Vec<GuaranteeView>,
    pub return_policy: ReturnPolicyView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuaranteeView {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub coverage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPolicyView {
    pub has_return: bool,
    pub return_days: u32,
    pub description: Option<String>,
}

impl From<BuyerProtection> for BuyerProtectionView {
    fn from(protection: BuyerProtection) -> Self {
        Self {
            has_protection: protection.has_protection,
            guarantees: protection
                .guarantees
                .into_iter()
                .map(|guarantee| GuaranteeView {
                    kind: guarantee.kind,
                    description: guarantee.description,
                    coverage: guarantee.coverage,
                })
                .collect(),
            return_policy: protection
                .return_policy
                .map(|policy| ReturnPolicyView {
                    has_return: policy.has_return,
                    return_days: policy.return_days,
                    description: Some(policy.description),
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct PurchaseAdapter {
    services: ServiceResolver,
}

impl PurchaseAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the options cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_shipping_options(
        &self,
        item: &ItemId,
        zip_code: &str,
        quantity: u32,
    ) -> AdapterResult<Vec<ShippingOptionView>> {
        let options = self
            .services
            .call(|services| services.shipping.get_shipping_options(item, zip_code, quantity))
            .await
            .fetching("shipping options")?;
        Ok(options.iter().map(ShippingOptionView::from).collect())
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing or variation does
    /// not exist.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_stock_info(&self, item: &ItemId, variation: Option<&VariationId>) -> AdapterResult<StockView> {
        let stock = self
            .services
            .call(|services| services.purchase.get_stock_info(item, variation))
            .await
            .fetching("stock info")?;
        Ok(StockView::from(&stock))
    }

    /// Open a cart holding the requested listing.
    ///
    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the quantity is rejected.
    #[instrument(skip(self, request), fields(item_id = %request.item_id, quantity = request.quantity))]
    pub async fn add_to_cart(&self, request: &CartRequest) -> AdapterResult<CartView> {
        let cart = self
            .services
            .call(|services| services.purchase.create_cart(&request.buyer_id, &request.item_id, request.quantity))
            .await
            .fetching("add to cart")?;
        Ok(CartView::from(&cart))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the cart does not exist.
    pub async fn get_cart(&self, id: &CartId) -> AdapterResult<CartView> {
        let cart = self
            .services
            .call(|services| services.purchase.get_cart(id))
            .await
            .fetching("cart")?;
        Ok(CartView::from(&cart))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the cart is missing or empty, or
    /// the payment method is not offered on its site.
    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    pub async fn initiate_checkout(&self, request: &CheckoutRequest) -> AdapterResult<CheckoutView> {
        let checkout = self
            .services
            .call(|services| services.purchase.initiate_checkout(request))
            .await
            .fetching("checkout")?;
        Ok(CheckoutView::from(checkout))
    }

    /// Buyer protection for the listing. A failed lookup falls back to the
    /// standard money-back and product guarantees.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_buyer_protection(&self, item: &ItemId) -> BuyerProtectionView {
        let protection = match self
            .services
            .call(|services| services.purchase.get_buyer_protection(item))
            .await
        {
            Ok(payload) => payload.data,
            Err(e) => {
                warn!(error = %e, "Buyer protection lookup failed, using standard protection");
                BuyerProtection::standard()
            }
        };
        BuyerProtectionView::from(protection)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::adapters::testing::fixture_resolver;

    const IPHONE: &str = "MCO123456789";

    #[test]
    fn test_total_cost() {
        let cost = TotalCost::new(
            Decimal::from(100),
            3,
            Decimal::from(15),
            Decimal::ZERO,
            CurrencyCode::Cop,
        );
        assert_eq!(cost.subtotal, Decimal::from(300));
        assert_eq!(cost.total, Decimal::from(315));
    }

    #[test]
    fn test_stock_view_defaults_max_to_available() {
        let stock = StockInfo {
            available_quantity: 4,
            ..StockInfo::default()
        };
        let view = StockView::from(&stock);
        assert_eq!(view.max_purchase_quantity, 4);
        assert_eq!(view.stock_status, StockStatus::LowStock);
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["stockStatus"], "low_stock");
    }

    #[test]
    fn test_days_until_delivery_never_negative() {
        let now = Utc::now();
        let mut option = ShippingOptionView::from(&ShippingOption::default());
        assert_eq!(option.days_until_delivery(now), None);
        option.estimated_delivery.date = Some(now + Duration::days(3) + Duration::hours(1));
        assert_eq!(option.days_until_delivery(now), Some(3));
        option.estimated_delivery.date = Some(now - Duration::days(2));
        assert_eq!(option.days_until_delivery(now), Some(0));
    }

    #[tokio::test]
    async fn test_fixture_shipping_options() {
        let adapter = PurchaseAdapter::new(fixture_resolver());
        let options = adapter
            .get_shipping_options(&ItemId::new(IPHONE), "110111", 1)
            .await
            .unwrap();
        assert_eq!(options.len(), 2);
        let flex = options.iter().find(|o| o.id.as_str() == "mercadoenvios_flex").unwrap();
        assert_eq!(flex.pickup_points, 2);
        assert!(flex.free_shipping);
    }

    #[tokio::test]
    async fn test_add_to_cart_and_checkout() {
        let adapter = PurchaseAdapter::new(fixture_resolver());
        let request = CartRequest {
            buyer_id: "buyer_1".to_owned(),
            item_id: ItemId::new(IPHONE),
            quantity: 2,
            variation_id: None,
        };
        let cart = adapter.add_to_cart(&request).await.unwrap();
        assert_eq!(cart.total_items, 2);
        assert_eq!(cart.total_amount, Decimal::from(9_798_000));

        let checkout = adapter
            .initiate_checkout(&CheckoutRequest {
                cart_id: cart.cart_id.clone(),
                payment_method_id: PaymentMethodId::new("credit_card"),
                shipping_address_id: None,
            })
            .await
            .unwrap();
        assert!(checkout.redirect_url.is_some());
        assert_eq!(checkout.total_amount, cart.total_with_shipping);
    }

    #[tokio::test]
    async fn test_protection_falls_back_to_standard() {
        let adapter = PurchaseAdapter::new(fixture_resolver());
        let protection = adapter.get_buyer_protection(&ItemId::new("MCO0")).await;
        assert!(protection.has_protection);
        assert_eq!(protection.guarantees.len(), 2);
        assert_eq!(protection.return_policy.return_days, 30);
    }
}
