use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{instrument, warn};
use vitrina_core::{ItemId, SellerId};

use super::{ConcernContext, UseCaseResult};
use crate::adapters::{CreditCardView, PaymentAdapter, PaymentMethodsView, ShippingMethodView};

const CONCERN: &str = "payment methods";

/// Accepted methods plus display summary and feature badges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodsInfo {
    #[serde(flatten)]
    pub methods: PaymentMethodsView,
    pub summary: PaymentSummary,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_methods: usize,
    pub has_credit_cards: bool,
    pub has_debit_cards: bool,
    pub has_digital_wallets: bool,
    pub has_bank_transfers: bool,
    pub has_cash_payments: bool,
    pub max_installments: u32,
    pub has_interest_free_installments: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethodsSummary {
    pub methods: Vec<ShippingMethodView>,
    pub has_free_shipping: bool,
    pub fastest_delivery: Option<ShippingMethodView>,
    pub cheapest_option: Option<ShippingMethodView>,
}

fn has_interest_free(cards: &[CreditCardView]) -> bool {
    cards
        .iter()
        .filter_map(|card| card.installments.as_deref())
        .flatten()
        .any(|plan| plan.is_interest_free())
}

fn summarize(methods: &PaymentMethodsView) -> PaymentSummary {
    PaymentSummary {
        total_methods: methods.total(),
        has_credit_cards: !methods.credit_cards.is_empty(),
        has_debit_cards: !methods.debit_cards.is_empty(),
        has_digital_wallets: !methods.digital_wallets.is_empty(),
        has_bank_transfers: !methods.bank_transfers.is_empty(),
        has_cash_payments: !methods.cash.is_empty(),
        max_installments: methods
            .credit_cards
            .iter()
            .filter_map(|card| card.max_installments)
            .max()
            .unwrap_or(0),
        has_interest_free_installments: has_interest_free(&methods.credit_cards),
    }
}

fn features(methods: &PaymentMethodsView) -> Vec<String> {
    let mut features = Vec::new();
    if !methods.credit_cards.is_empty() {
        features.push("Tarjetas de crédito".to_owned());
    }
    if methods
        .digital_wallets
        .iter()
        .any(|wallet| wallet.name.to_lowercase().contains("mercadopago"))
    {
        features.push("MercadoPago".to_owned());
    }
    if has_interest_free(&methods.credit_cards) {
        features.push("Cuotas sin interés".to_owned());
    }
    if !methods.cash.is_empty() {
        features.push("Efectivo".to_owned());
    }
    features
}

/// Earliest dated method; undated methods only win when nothing is dated.
fn fastest(methods: &[ShippingMethodView]) -> Option<ShippingMethodView> {
    methods
        .iter()
        .filter(|method| method.estimated_delivery.is_some())
        .min_by_key(|method| method.estimated_delivery)
        .or_else(|| methods.first())
        .cloned()
}

fn cheapest(methods: &[ShippingMethodView]) -> Option<ShippingMethodView> {
    methods.iter().min_by_key(|method| method.cost).cloned()
}

#[derive(Clone)]
pub struct GetPaymentMethods {
    payment: PaymentAdapter,
}

impl GetPaymentMethods {
    #[must_use]
    pub const fn new(payment: PaymentAdapter) -> Self {
        Self { payment }
    }

    /// Methods the seller accepts. With a positive `amount`, every credit
    /// card also carries its installment plans; a card whose plans cannot be
    /// fetched is kept without them.
    ///
    /// # Errors
    ///
    /// Fails when the seller's methods cannot be fetched.
    #[instrument(skip(self), fields(seller_id = %seller))]
    pub async fn execute(&self, seller: SellerId, amount: Option<Decimal>) -> UseCaseResult<PaymentMethodsInfo> {
        let mut methods = self
            .payment
            .get_payment_methods(seller)
            .await
            .concerning(CONCERN)?;

        if let Some(amount) = amount.filter(|amount| amount.is_sign_positive() && !amount.is_zero()) {
            let cards = std::mem::take(&mut methods.credit_cards);
            methods.credit_cards = join_all(cards.into_iter().map(|card| self.with_installments(card, amount))).await;
        }

        Ok(PaymentMethodsInfo {
            summary: summarize(&methods),
            features: features(&methods),
            methods,
        })
    }

    async fn with_installments(&self, mut card: CreditCardView, amount: Decimal) -> CreditCardView {
        match self.payment.get_installments(amount, &card.id).await {
            Ok(plans) => card.installments = Some(plans),
            Err(e) => warn!(card = %card.id, error = %e, "Could not fetch installments for card"),
        }
        card
    }

    /// # Errors
    ///
    /// Fails when the shipping methods cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn shipping_options(&self, item: &ItemId, zip_code: &str) -> UseCaseResult<ShippingMethodsSummary> {
        let methods = self
            .payment
            .get_shipping_methods(item, zip_code)
            .await
            .concerning("shipping options")?;
        Ok(ShippingMethodsSummary {
            has_free_shipping: methods.iter().any(|method| method.free_shipping),
            fastest_delivery: fastest(&methods),
            cheapest_option: cheapest(&methods),
            methods,
        })
    }
}
