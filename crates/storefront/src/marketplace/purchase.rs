use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrina_core::{
    CartId, CurrencyCode, ItemCondition, ItemId, OrderId, OrderStatus, PaymentMethodId,
    ShipmentId, ShippingServiceId, SiteId, VariationId,
};

use super::{EstimatedDelivery, Item, flexible_id};

/// Stock figures for a listing or one of its variations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockInfo {
    pub available_quantity: u32,
    pub sold_quantity: u32,
    pub max_purchase_quantity: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StockInfo {
    /// Stock of the listing, or of `variation` when given. `None` if the
    /// variation does not exist.
    #[must_use]
    pub fn from_item(item: &Item, variation: Option<&VariationId>) -> Option<Self> {
        let (available, sold) = match variation {
            Some(id) => {
                let variation = item.variation(id)?;
                (variation.available_quantity, variation.sold_quantity)
            }
            None => (item.available_quantity, item.sold_quantity),
        };
        Some(Self {
            available_quantity: available,
            sold_quantity: sold,
            max_purchase_quantity: available,
            last_updated: item.last_updated,
        })
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cart {
    #[serde(alias = "cart_id")]
    pub id: CartId,
    pub site_id: Option<SiteId>,
    pub buyer_id: String,
    pub date_created: Option<DateTime<Utc>>,
    pub date_updated: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub items: Vec<CartItem>,
    pub coupons: Vec<AppliedCoupon>,
    pub summary: CartSummary,
    pub shipping_options: Vec<CartShippingOption>,
}

impl Cart {
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Recompute the summary from items, shipping and coupons.
    ///
    /// Percentage coupons are re-applied to the new subtotal so the discount
    /// follows quantity changes. The discount never exceeds subtotal plus
    /// shipping, so the total never goes negative.
    pub fn recompute(&mut self) {
        let total: Decimal = self.items.iter().map(CartItem::subtotal).sum();
        for coupon in &mut self.coupons {
            if coupon.kind == CouponKind::Percentage {
                coupon.amount = total * coupon.discount;
            }
        }
        let discount = self
            .coupons
            .iter()
            .map(|c| c.amount)
            .sum::<Decimal>()
            .min(total + self.summary.shipping_cost);
        self.summary.total_amount = total;
        self.summary.discount_amount = discount;
        self.summary.total_amount_with_shipping = total + self.summary.shipping_cost - discount;
        self.summary.total_items = self.items.iter().map(|item| item.quantity).sum();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItem {
    pub id: ItemId,
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub currency_id: Option<CurrencyCode>,
    pub available_quantity: u32,
    pub condition: ItemCondition,
    pub warranty: Option<String>,
    pub shipping: Option<CartItemShipping>,
}

impl CartItem {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItemShipping {
    pub free_shipping: bool,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSummary {
    pub total_amount: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub total_amount_with_shipping: Decimal,
    pub currency_id: Option<CurrencyCode>,
    pub total_items: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartShippingOption {
    pub id: ShippingServiceId,
    pub name: String,
    pub cost: Decimal,
    pub estimated_delivery: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    #[default]
    Percentage,
    Fixed,
    FreeShipping,
}

/// A coupon applied to a cart. `amount` is the discount it currently grants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppliedCoupon {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    /// Fraction for percentage coupons, currency amount for fixed ones.
    pub discount: Decimal,
    pub description: String,
    pub amount: Decimal,
}

/// Request to add a listing to a cart; also the live `/carts` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRequest {
    pub buyer_id: String,
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub cart_id: CartId,
    pub payment_method_id: PaymentMethodId,
    #[serde(default)]
    pub shipping_address_id: Option<String>,
}

/// A started checkout session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checkout {
    pub checkout_id: String,
    pub redirect_url: Option<String>,
    pub status: String,
    pub total_amount: Decimal,
    pub payment_info: Option<CheckoutPayment>,
    pub shipping_info: Option<CheckoutShipping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutPayment {
    pub payment_method_id: PaymentMethodId,
    pub currency_id: Option<CurrencyCode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutShipping {
    pub shipping_address_id: Option<String>,
    pub cost: Decimal,
}

/// Guarantees covering a purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuyerProtection {
    pub has_protection: bool,
    pub guarantees: Vec<Guarantee>,
    pub return_policy: Option<ReturnPolicy>,
}

impl BuyerProtection {
    /// Protection every purchase gets when the listing reports none.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            has_protection: true,
            guarantees: vec![
                Guarantee {
                    kind: "money_back".to_owned(),
                    description: "Devolución del dinero si no recibes el producto".to_owned(),
                    coverage: "full".to_owned(),
                },
                Guarantee {
                    kind: "product_guarantee".to_owned(),
                    description: "Garantía del producto por defectos de fábrica".to_owned(),
                    coverage: "manufacturer".to_owned(),
                },
            ],
            return_policy: Some(ReturnPolicy {
                has_return: true,
                return_days: 30,
                description: "Tienes 30 días para devolver el producto".to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guarantee {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub coverage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnPolicy {
    pub has_return: bool,
    pub return_days: u32,
    pub description: String,
}

/// A purchase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: OrderId,
    pub date_created: Option<DateTime<Utc>>,
    pub date_closed: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub status_detail: Option<StatusDetail>,
    pub currency_id: Option<CurrencyCode>,
    pub order_items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub total_amount_with_shipping: Decimal,
    pub paid_amount: Decimal,
    pub shipping: Option<OrderShipping>,
    pub payments: Vec<OrderPayment>,
    pub buyer: Option<OrderParty>,
    pub seller: Option<OrderParty>,
}

impl Order {
    /// Move to `status`, closing the order when it is paid or cancelled.
    pub fn transition(&mut self, status: OrderStatus, detail: StatusDetail, now: DateTime<Utc>) {
        self.status = status;
        self.status_detail = Some(detail);
        self.last_updated = Some(now);
        if status.is_closed() {
            self.date_closed = Some(now);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusDetail {
    pub code: String,
    pub description: String,
}

impl StatusDetail {
    #[must_use]
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_owned(),
            description: description.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItem {
    pub item: OrderedItem,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub full_unit_price: Decimal,
    pub currency_id: Option<CurrencyCode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderedItem {
    pub id: ItemId,
    pub title: String,
    pub category_id: Option<String>,
    pub condition: ItemCondition,
    pub warranty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderShipping {
    pub id: ShipmentId,
    pub status: String,
    pub cost: Decimal,
    pub currency_id: Option<CurrencyCode>,
    pub estimated_delivery: Option<EstimatedDelivery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPayment {
    pub id: String,
    pub order_id: Option<OrderId>,
    pub status: String,
    pub status_detail: Option<String>,
    pub currency_id: Option<CurrencyCode>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub payment_type: Option<String>,
    pub installments: u32,
    pub transaction_amount: Decimal,
    pub date_created: Option<DateTime<Utc>>,
}

/// Buyer or seller on an order. Ids are numeric for sellers, opaque for buyers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderParty {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub cart_id: CartId,
    #[serde(default)]
    pub buyer_email: Option<String>,
}

/// A payment submitted against an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_method_id: PaymentMethodId,
    pub amount: Decimal,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub installments: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_detail: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart(unit_price: i64, quantity: u32) -> Cart {
        let mut cart = Cart {
            id: CartId::new("cart_test"),
            items: vec![CartItem {
                id: ItemId::new("MCO1"),
                quantity,
                unit_price: Decimal::from(unit_price),
                ..CartItem::default()
            }],
            ..Cart::default()
        };
        cart.recompute();
        cart
    }

    #[test]
    fn test_percentage_coupon_follows_quantity() {
        let mut cart = cart(100_000, 1);
        cart.coupons.push(AppliedCoupon {
            id: "WELCOME10".to_owned(),
            kind: CouponKind::Percentage,
            discount: Decimal::new(10, 2),
            ..AppliedCoupon::default()
        });
        cart.recompute();
        assert_eq!(cart.summary.discount_amount, Decimal::from(10_000));
        assert_eq!(cart.summary.total_amount_with_shipping, Decimal::from(90_000));

        cart.item_mut(&ItemId::new("MCO1")).unwrap().quantity = 2;
        cart.recompute();
        assert_eq!(cart.summary.total_amount, Decimal::from(200_000));
        assert_eq!(cart.summary.discount_amount, Decimal::from(20_000));
        assert_eq!(cart.summary.total_items, 2);
    }

    #[test]
    fn test_fixed_coupon_larger_than_cart_stops_at_zero() {
        let mut cart = cart(20_000, 1);
        cart.summary.shipping_cost = Decimal::from(5_000);
        cart.coupons.push(AppliedCoupon {
            id: "SAVE50000".to_owned(),
            kind: CouponKind::Fixed,
            discount: Decimal::from(50_000),
            amount: Decimal::from(50_000),
            ..AppliedCoupon::default()
        });
        cart.recompute();
        assert_eq!(cart.summary.discount_amount, Decimal::from(25_000));
        assert_eq!(cart.summary.total_amount_with_shipping, Decimal::ZERO);
    }

    #[test]
    fn test_stock_for_missing_variation_is_none() {
        let item = Item {
            available_quantity: 3,
            sold_quantity: 9,
            ..Item::default()
        };
        let stock = StockInfo::from_item(&item, None).unwrap();
        assert_eq!(stock.max_purchase_quantity, 3);
        assert!(StockInfo::from_item(&item, Some(&VariationId::new("nope"))).is_none());
    }

    #[test]
    fn test_closing_statuses_set_date_closed() {
        let now = Utc::now();
        let mut order = Order::default();
        order.transition(
            OrderStatus::PaymentInProcess,
            StatusDetail::new("processing", "Procesando"),
            now,
        );
        assert!(order.date_closed.is_none());
        order.transition(OrderStatus::Cancelled, StatusDetail::new("user_cancelled", "x"), now);
        assert_eq!(order.date_closed, Some(now));
        assert_eq!(order.last_updated, Some(now));
    }
}
