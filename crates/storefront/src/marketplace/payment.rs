use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrina_core::{CurrencyCode, PaymentMethodId};

/// A payment method offered on a site (`/sites/{site}/payment_methods`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub payment_type_id: String,
    pub status: Option<String>,
    pub secure_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub deferred_capture: Option<String>,
    pub additional_info_needed: Vec<String>,
    pub min_installments: Option<u32>,
    pub max_installments: Option<u32>,
    pub accreditation_time: Option<u32>,
    pub processing_modes: Vec<String>,
    pub installments: Vec<InstallmentOption>,
}

impl PaymentMethod {
    /// Secure thumbnail, else the plain one.
    #[must_use]
    pub fn logo(&self) -> Option<&str> {
        self.secure_thumbnail.as_deref().or(self.thumbnail.as_deref())
    }
}

/// Installment plan attached to a payment method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallmentOption {
    pub installments: u32,
    pub installment_rate: Decimal,
    pub discount_rate: Decimal,
    pub labels: Vec<String>,
}

/// Payment methods a seller accepts, grouped by payment type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptedPaymentMethods {
    pub credit_cards: Vec<PaymentMethod>,
    pub debit_cards: Vec<PaymentMethod>,
    pub digital_wallets: Vec<PaymentMethod>,
    pub bank_transfers: Vec<PaymentMethod>,
    pub cash: Vec<PaymentMethod>,
}

impl AcceptedPaymentMethods {
    /// Group site methods by `payment_type_id`; unknown types are dropped.
    #[must_use]
    pub fn group(methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        let mut grouped = Self::default();
        for method in methods {
            match method.payment_type_id.as_str() {
                "credit_card" => grouped.credit_cards.push(method),
                "debit_card" => grouped.debit_cards.push(method),
                "bank_transfer" => grouped.bank_transfers.push(method),
                "ticket" | "atm" => grouped.cash.push(method),
                "account_money" | "digital_wallet" | "digital_currency" => {
                    grouped.digital_wallets.push(method);
                }
                _ => {}
            }
        }
        grouped
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.credit_cards.len()
            + self.debit_cards.len()
            + self.digital_wallets.len()
            + self.bank_transfers.len()
            + self.cash.len()
    }
}

/// Cost of paying `amount` in a number of installments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayerCost {
    #[serde(alias = "installments")]
    pub quantity: u32,
    pub installment_rate: Decimal,
    pub installment_amount: Decimal,
    pub total_amount: Decimal,
    pub currency_id: Option<CurrencyCode>,
    pub labels: Vec<String>,
}

impl PayerCost {
    /// Apply the plan's rate to `amount`: total is `amount * (1 + rate / 100)`.
    #[must_use]
    pub fn quote(amount: Decimal, plan: &InstallmentOption, currency: CurrencyCode) -> Self {
        let total = amount * (Decimal::ONE + plan.installment_rate / Decimal::ONE_HUNDRED);
        let quantity = plan.installments.max(1);
        Self {
            quantity,
            installment_rate: plan.installment_rate,
            installment_amount: total / Decimal::from(quantity),
            total_amount: total,
            currency_id: Some(currency),
            labels: plan.labels.clone(),
        }
    }

    #[must_use]
    pub fn is_interest_free(&self) -> bool {
        self.installment_rate.is_zero()
    }
}

/// Installment quotes per payment method, as the installments endpoint returns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallmentQuote {
    pub payment_method_id: PaymentMethodId,
    pub payment_type_id: Option<String>,
    pub payer_costs: Vec<PayerCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentValidationRequest {
    pub payment_method_id: PaymentMethodId,
    pub amount: Decimal,
    #[serde(default)]
    pub installments: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentValidation {
    pub valid: bool,
    pub payment_method_id: PaymentMethodId,
    pub errors: Vec<String>,
}
