use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{info, instrument};
use vitrina_core::ItemId;

use super::{ConcernContext, UseCaseError, UseCaseResult};
use crate::adapters::{
    BuyerProtectionView, CartView, CheckoutView, ProductAdapter, PurchaseAdapter,
    ShippingOptionView, StockView, TotalCost,
};
use crate::marketplace::{CartRequest, CheckoutRequest};

const OUT_OF_STOCK: &str = "Cantidad no disponible en stock";
/// Stand-in delivery time for options without an estimate.
const UNKNOWN_DELIVERY_DAYS: i64 = 999;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCostInfo {
    #[serde(flatten)]
    pub cost: TotalCost,
    pub stock_info: StockView,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingOptionsSummary {
    pub options: Vec<ShippingOptionView>,
    pub summary: ShippingSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSummary {
    pub has_free_shipping: bool,
    pub fastest_option: Option<ShippingOptionView>,
    pub cheapest_option: Option<ShippingOptionView>,
    pub recommended_option: Option<ShippingOptionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartConfirmation {
    pub success: bool,
    pub cart_info: CartView,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfirmation {
    pub success: bool,
    pub checkout_info: CheckoutView,
    pub next_steps: Vec<CheckoutStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutStep {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyerProtectionInfo {
    #[serde(flatten)]
    pub protection: BuyerProtectionView,
    pub summary: ProtectionSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionSummary {
    pub has_money_back_guarantee: bool,
    pub has_product_guarantee: bool,
    pub can_return: bool,
    pub return_days: u32,
}

fn delivery_days(option: &ShippingOptionView, now: DateTime<Utc>) -> i64 {
    option
        .days_until_delivery(now)
        .unwrap_or(UNKNOWN_DELIVERY_DAYS)
}

fn fastest(options: &[ShippingOptionView], now: DateTime<Utc>) -> Option<ShippingOptionView> {
    options
        .iter()
        .min_by_key(|option| delivery_days(option, now))
        .cloned()
}

fn cheapest(options: &[ShippingOptionView]) -> Option<ShippingOptionView> {
    options.iter().min_by_key(|option| option.cost).cloned()
}

/// Balance of price and speed, higher is better: the cost scores against
/// 10 000 per point (capped at 100) and every delivery day costs one point.
#[allow(clippy::cast_precision_loss)]
fn shipping_score(option: &ShippingOptionView, now: DateTime<Utc>) -> f64 {
    let cost = (option.cost / Decimal::from(10_000)).to_f64().unwrap_or(f64::MAX);
    let cost_score = 100.0 - cost.min(100.0);
    let time_score = 100.0 - delivery_days(option, now) as f64;
    f64::midpoint(cost_score, time_score)
}

/// The fastest free option; without free shipping, the best scoring one.
fn recommended(options: &[ShippingOptionView], now: DateTime<Utc>) -> Option<ShippingOptionView> {
    let free: Vec<ShippingOptionView> = options
        .iter()
        .filter(|option| option.free_shipping)
        .cloned()
        .collect();
    if !free.is_empty() {
        return fastest(&free, now);
    }
    options
        .iter()
        .fold(None::<&ShippingOptionView>, |best, current| match best {
            Some(best) if shipping_score(current, now) <= shipping_score(best, now) => Some(best),
            _ => Some(current),
        })
        .cloned()
}

fn next_steps(checkout: &CheckoutView) -> Vec<CheckoutStep> {
    let mut steps = Vec::with_capacity(2);
    if let Some(url) = &checkout.redirect_url {
        steps.push(CheckoutStep {
            kind: "redirect".to_owned(),
            description: "Completar pago en la plataforma de pago".to_owned(),
            url: Some(url.clone()),
        });
    }
    steps.push(CheckoutStep {
        kind: "tracking".to_owned(),
        description: "Hacer seguimiento del pedido".to_owned(),
        url: None,
    });
    steps
}

fn protection_summary(protection: &BuyerProtectionView) -> ProtectionSummary {
    let has_guarantee = |kind: &str| protection.guarantees.iter().any(|g| g.kind == kind);
    ProtectionSummary {
        has_money_back_guarantee: has_guarantee("money_back"),
        has_product_guarantee: has_guarantee("product_guarantee"),
        can_return: protection.return_policy.has_return,
        return_days: protection.return_policy.return_days,
    }
}

/// Pricing, cart and checkout flow for a single listing.
#[derive(Clone)]
pub struct PurchaseProduct {
    purchase: PurchaseAdapter,
    product: ProductAdapter,
}

impl PurchaseProduct {
    #[must_use]
    pub const fn new(purchase: PurchaseAdapter, product: ProductAdapter) -> Self {
        Self { purchase, product }
    }

    /// Price of `quantity` units, shipped with the cheapest option when a
    /// zip code is given. Taxes are not itemized and stay at zero.
    ///
    /// # Errors
    ///
    /// Fails when stock cannot cover `quantity`, or any lookup fails.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn calculate_total_cost(
        &self,
        item: &ItemId,
        quantity: u32,
        zip_code: Option<&str>,
    ) -> UseCaseResult<TotalCostInfo> {
        const CONCERN: &str = "total cost";

        let stock = self
            .purchase
            .get_stock_info(item, None)
            .await
            .concerning(CONCERN)?;
        if stock.available < quantity {
            return Err(UseCaseError::rejected(CONCERN, OUT_OF_STOCK));
        }

        let price = self
            .product
            .get_product_info(item)
            .await
            .concerning(CONCERN)?
            .price;

        let shipping = match zip_code {
            Some(zip_code) => self
                .purchase
                .get_shipping_options(item, zip_code, quantity)
                .await
                .concerning(CONCERN)?
                .iter()
                .map(|option| option.cost)
                .min()
                .unwrap_or(Decimal::ZERO),
            None => Decimal::ZERO,
        };

        let cost = TotalCost::new(price.amount, quantity, shipping, Decimal::ZERO, price.currency);
        Ok(TotalCostInfo {
            breakdown: CostBreakdown {
                unit_price: price.amount,
                quantity,
                subtotal: cost.subtotal,
                shipping: cost.shipping,
                taxes: cost.taxes,
                total: cost.total,
            },
            cost,
            stock_info: stock,
        })
    }

    /// # Errors
    ///
    /// Fails when the options cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn shipping_options(
        &self,
        item: &ItemId,
        zip_code: &str,
        quantity: u32,
    ) -> UseCaseResult<ShippingOptionsSummary> {
        let options = self
            .purchase
            .get_shipping_options(item, zip_code, quantity)
            .await
            .concerning("shipping options")?;
        let now = Utc::now();
        Ok(ShippingOptionsSummary {
            summary: ShippingSummary {
                has_free_shipping: options.iter().any(|option| option.free_shipping),
                fastest_option: fastest(&options, now),
                cheapest_option: cheapest(&options),
                recommended_option: recommended(&options, now),
            },
            options,
        })
    }

    /// Checks stock for the requested variation, then opens a cart.
    ///
    /// # Errors
    ///
    /// Fails when stock cannot cover the quantity or the cart is rejected.
    #[instrument(skip(self, request), fields(item_id = %request.item_id, quantity = request.quantity))]
    pub async fn add_to_cart(&self, request: &CartRequest) -> UseCaseResult<CartConfirmation> {
        const CONCERN: &str = "add to cart";

        let stock = self
            .purchase
            .get_stock_info(&request.item_id, request.variation_id.as_ref())
            .await
            .concerning(CONCERN)?;
        if stock.available < request.quantity {
            return Err(UseCaseError::rejected(CONCERN, OUT_OF_STOCK));
        }

        let cart = self.purchase.add_to_cart(request).await.concerning(CONCERN)?;
        info!(cart_id = %cart.cart_id, "Added to cart");
        Ok(CartConfirmation {
            success: true,
            cart_info: cart,
            message: "Producto agregado al carrito correctamente".to_owned(),
        })
    }

    /// # Errors
    ///
    /// Fails when the checkout is rejected.
    #[instrument(skip(self, request), fields(cart_id = %request.cart_id))]
    pub async fn initiate_checkout(&self, request: &CheckoutRequest) -> UseCaseResult<CheckoutConfirmation> {
        let checkout = self
            .purchase
            .initiate_checkout(request)
            .await
            .concerning("checkout")?;
        Ok(CheckoutConfirmation {
            success: true,
            next_steps: next_steps(&checkout),
            checkout_info: checkout,
        })
    }

    pub async fn buyer_protection(&self, item: &ItemId) -> BuyerProtectionInfo {
        let protection = self.purchase.get_buyer_protection(item).await;
        BuyerProtectionInfo {
            summary: protection_summary(&protection),
            protection,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use vitrina_core::{CurrencyCode, PaymentMethodId, ShippingServiceId};

    use super::*;
    use crate::adapters::DeliveryWindow;
    use crate::usecases::testing::fixture_use_cases;

    const IPHONE: &str = "MCO123456789";

    fn option(id: &str, cost: i64, date: Option<DateTime<Utc>>) -> ShippingOptionView {
        ShippingOptionView {
            id: ShippingServiceId::new(id),
            name: id.to_owned(),
            display_name: None,
            cost: Decimal::from(cost),
            list_cost: Decimal::from(cost),
            currency: CurrencyCode::Cop,
            free_shipping: cost == 0,
            estimated_delivery: DeliveryWindow {
                date,
                unit: None,
                offset_days: None,
            },
            speed_ranking: None,
            pickup_points: 0,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_recommended_prefers_fastest_free_option() {
        let now = Utc::now();
        let options = vec![
            option("paid_fast", 9_000, Some(now + Duration::days(1))),
            option("free_slow", 0, Some(now + Duration::days(8) + Duration::hours(1))),
            option("free_fast", 0, Some(now + Duration::days(3) + Duration::hours(1))),
        ];
        assert_eq!(recommended(&options, now).unwrap().id.as_str(), "free_fast");
        assert_eq!(fastest(&options, now).unwrap().id.as_str(), "paid_fast");
        assert_eq!(cheapest(&options).unwrap().id.as_str(), "free_slow");
    }

    #[test]
    fn test_recommended_balances_cost_and_time() {
        let now = Utc::now();
        let options = vec![
            // cost score 99, time score 95 -> 97
            option("cheap_slow", 10_000, Some(now + Duration::days(5) + Duration::hours(1))),
            // cost score 50, time score 99 -> 74.5
            option("pricey_fast", 500_000, Some(now + Duration::days(1) + Duration::hours(1))),
            // unknown delivery counts as 999 days
            option("undated", 1_000, None),
        ];
        assert_eq!(recommended(&options, now).unwrap().id.as_str(), "cheap_slow");
        assert!(recommended(&[], now).is_none());
    }

    #[tokio::test]
    async fn test_total_cost_with_shipping() {
        let info = fixture_use_cases()
            .purchase
            .calculate_total_cost(&ItemId::new(IPHONE), 2, Some("110111"))
            .await
            .unwrap();
        assert_eq!(info.breakdown.unit_price, Decimal::from(4_899_000));
        assert_eq!(info.cost.subtotal, Decimal::from(9_798_000));
        assert_eq!(info.cost.shipping, Decimal::ZERO);
        assert_eq!(info.cost.total, Decimal::from(9_798_000));
        assert_eq!(info.stock_info.available, 45);

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("subtotal").is_some());
        assert_eq!(json["breakdown"]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_total_cost_rejects_excess_quantity() {
        let err = fixture_use_cases()
            .purchase
            .calculate_total_cost(&ItemId::new(IPHONE), 46, None)
            .await
            .unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(err.to_string(), "Error getting total cost: Cantidad no disponible en stock");
    }

    #[tokio::test]
    async fn test_fixture_shipping_summary() {
        let result = fixture_use_cases()
            .purchase
            .shipping_options(&ItemId::new(IPHONE), "110111", 1)
            .await
            .unwrap();
        assert!(result.summary.has_free_shipping);
        assert_eq!(
            result.summary.recommended_option.unwrap().id.as_str(),
            "mercadoenvios_flex"
        );
    }

    #[tokio::test]
    async fn test_add_to_cart_then_checkout() {
        let purchase = fixture_use_cases().purchase;
        let request = CartRequest {
            buyer_id: "buyer_1".to_owned(),
            item_id: ItemId::new(IPHONE),
            quantity: 1,
            variation_id: Some(vitrina_core::VariationId::new("174997747230")),
        };
        let confirmation = purchase.add_to_cart(&request).await.unwrap();
        assert!(confirmation.success);
        assert_eq!(confirmation.message, "Producto agregado al carrito correctamente");

        let checkout = purchase
            .initiate_checkout(&CheckoutRequest {
                cart_id: confirmation.cart_info.cart_id,
                payment_method_id: PaymentMethodId::new("credit_card"),
                shipping_address_id: None,
            })
            .await
            .unwrap();
        let kinds: Vec<_> = checkout.next_steps.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["redirect", "tracking"]);
    }

    #[tokio::test]
    async fn test_add_to_cart_checks_variation_stock() {
        let request = CartRequest {
            buyer_id: "buyer_1".to_owned(),
            item_id: ItemId::new(IPHONE),
            quantity: 16,
            variation_id: Some(vitrina_core::VariationId::new("174997747230")),
        };
        let err = fixture_use_cases().purchase.add_to_cart(&request).await.unwrap_err();
        assert!(err.is_rejected());
    }

    #[tokio::test]
    async fn test_protection_summary() {
        let info = fixture_use_cases()
            .purchase
            .buyer_protection(&ItemId::new(IPHONE))
            .await;
        assert!(info.summary.has_money_back_guarantee);
        assert!(info.summary.can_return);
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("hasProtection").is_some());
        assert!(json["summary"].get("returnDays").is_some());
    }
}
