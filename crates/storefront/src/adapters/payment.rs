use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{CurrencyCode, ItemId, PaymentMethodId, SellerId, ShippingServiceId, SiteId};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{AcceptedPaymentMethods, PayerCost, PaymentMethod, ShippingOption};
use crate::services::ServiceResolver;

/// Accepted payment methods grouped for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsView {
    pub credit_cards: Vec<CreditCardView>,
    pub debit_cards: Vec<PaymentMethodView>,
    pub digital_wallets: Vec<PaymentMethodView>,
    pub bank_transfers: Vec<BankTransferView>,
    pub cash: Vec<PaymentMethodView>,
}

impl PaymentMethodsView {
    #[must_use]
    pub fn total(&self) -> usize {
        self.credit_cards.len()
            + self.debit_cards.len()
            + self.digital_wallets.len()
            + self.bank_transfers.len()
            + self.cash.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardView {
    pub id: PaymentMethodId,
    pub name: String,
    pub logo: Option<String>,
    pub max_installments: Option<u32>,
    pub min_installments: Option<u32>,
    pub processing_modes: Vec<String>,
    /// Filled in by the payment-methods use case when an amount is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<Vec<InstallmentView>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodView {
    pub id: PaymentMethodId,
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferView {
    pub id: PaymentMethodId,
    pub name: String,
    /// Accreditation time in minutes.
    pub processing_time: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentView {
    pub installments: u32,
    pub installment_rate: Decimal,
    pub installment_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Option<CurrencyCode>,
    pub labels: Vec<String>,
}

impl InstallmentView {
    #[must_use]
    pub fn is_interest_free(&self) -> bool {
        self.installment_rate.is_zero()
    }
}

impl From<PayerCost> for InstallmentView {
    fn from(cost: PayerCost) -> Self {
        Self {
            installments: cost.quantity,
            installment_rate: cost.installment_rate,
            installment_amount: cost.installment_amount,
            total_amount: cost.total_amount,
            currency: cost.currency_id,
            labels: cost.labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethodView {
    pub id: ShippingServiceId,
    pub name: String,
    pub cost: Decimal,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub free_shipping: bool,
}

impl From<&ShippingOption> for ShippingMethodView {
    fn from(option: &ShippingOption) -> Self {
        Self {
            id: option.id.clone(),
            name: option.name.clone(),
            cost: option.cost,
            estimated_delivery: option.delivery_date(),
            free_shipping: option.free_shipping.flag,
        }
    }
}

fn method_view(method: &PaymentMethod) -> PaymentMethodView {
    PaymentMethodView {
        id: method.id.clone(),
        name: method.name.clone(),
        logo: method.logo().map(str::to_owned),
    }
}

impl From<&AcceptedPaymentMethods> for PaymentMethodsView {
    fn from(methods: &AcceptedPaymentMethods) -> Self {
        Self {
            credit_cards: methods
                .credit_cards
                .iter()
                .map(|card| CreditCardView {
                    id: card.id.clone(),
                    name: card.name.clone(),
                    logo: card.logo().map(str::to_owned),
                    max_installments: card.max_installments,
                    min_installments: card.min_installments,
                    processing_modes: card.processing_modes.clone(),
                    installments: None,
                })
                .collect(),
            debit_cards: methods.debit_cards.iter().map(method_view).collect(),
            digital_wallets: methods.digital_wallets.iter().map(method_view).collect(),
            bank_transfers: methods
                .bank_transfers
                .iter()
                .map(|transfer| BankTransferView {
                    id: transfer.id.clone(),
                    name: transfer.name.clone(),
                    processing_time: transfer.accreditation_time,
                })
                .collect(),
            cash: methods.cash.iter().map(method_view).collect(),
        }
    }
}

#[derive(Clone)]
pub struct PaymentAdapter {
    services: ServiceResolver,
    site: SiteId,
}

impl PaymentAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver, site: SiteId) -> Self {
        Self { services, site }
    }

    #[must_use]
    pub const fn site(&self) -> SiteId {
        self.site
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the seller's methods cannot be fetched.
    #[instrument(skip(self), fields(seller_id = %seller))]
    pub async fn get_payment_methods(&self, seller: SellerId) -> AdapterResult<PaymentMethodsView> {
        let methods = self
            .services
            .call(|services| services.payment.get_accepted_methods(seller))
            .await
            .fetching("payment methods")?;
        Ok(PaymentMethodsView::from(&methods))
    }

    /// Installment plans for `amount` on the adapter's site.
    ///
    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the method is unknown or the
    /// lookup fails.
    #[instrument(skip(self), fields(method = %method))]
    pub async fn get_installments(
        &self,
        amount: Decimal,
        method: &PaymentMethodId,
    ) -> AdapterResult<Vec<InstallmentView>> {
        let costs = self
            .services
            .call(|services| services.payment.get_installments(amount, method, self.site))
            .await
            .fetching("installments")?;
        Ok(costs.into_iter().map(InstallmentView::from).collect())
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the options cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_shipping_methods(&self, item: &ItemId, zip_code: &str) -> AdapterResult<Vec<ShippingMethodView>> {
        let options = self
            .services
            .call(|services| services.shipping.get_shipping_options(item, zip_code, 1))
            .await
            .fetching("shipping methods")?;
        Ok(options.iter().map(ShippingMethodView::from).collect())
    }
}
