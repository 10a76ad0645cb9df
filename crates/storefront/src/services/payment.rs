use async_trait::async_trait;
use rust_decimal::Decimal;
use vitrina_core::{PaymentMethodId, SellerId, SiteId};

use super::ServiceResult;
use crate::marketplace::{
    AcceptedPaymentMethods, PayerCost, PaymentMethod, PaymentValidation, PaymentValidationRequest,
};

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Methods the seller accepts, grouped by payment type.
    async fn get_accepted_methods(&self, seller: SellerId) -> ServiceResult<AcceptedPaymentMethods>;

    async fn get_site_methods(&self, site: SiteId) -> ServiceResult<Vec<PaymentMethod>>;

    /// Installment plans for paying `amount` with `method`.
    async fn get_installments(
        &self,
        amount: Decimal,
        method: &PaymentMethodId,
        site: SiteId,
    ) -> ServiceResult<Vec<PayerCost>>;

    async fn get_method(&self, method: &PaymentMethodId, site: SiteId) -> ServiceResult<PaymentMethod>;

    async fn validate_payment(
        &self,
        request: &PaymentValidationRequest,
    ) -> ServiceResult<PaymentValidation>;
}
