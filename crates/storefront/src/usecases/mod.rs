//! Use cases: one denormalized response per product-page concern.
//!
//! A use case calls one or more adapters and derives summaries, buckets and
//! insights from their views. Any adapter failure aborts the whole use case
//! with an error naming the concern; callers never see a partial result.

mod navigation;
mod payment_methods;
mod product_info;
mod product_page;
mod purchase;
mod questions;
mod reviews;
mod seller_info;

pub use navigation::{
    CategoryFilters, FilterGroups, FilterOption, GetNavigation, ListItem, Navigation,
    StructuredBreadcrumbs, AvailableFilter,
};
pub use payment_methods::{
    GetPaymentMethods, PaymentMethodsInfo, PaymentSummary, ShippingMethodsSummary,
};
pub use product_info::{GetProductInfo, ProductInfo};
pub use product_page::{GetProductPage, ProductPage, ProductPageOptions};
pub use purchase::{
    CartConfirmation, CheckoutConfirmation, CheckoutStep, CostBreakdown, ProtectionSummary,
    PurchaseProduct, ShippingOptionsSummary, ShippingSummary, TotalCostInfo, BuyerProtectionInfo,
};
pub use questions::{
    CategorizedQuestions, GetProductQuestions, ProductQuestions, QuestionSubmission,
    QuestionsSummary, TopicCount,
};
pub use reviews::{
    CategorizedReviews, GetProductReviews, KeywordCount, MonthlyTrend, ProductReviews,
    ReviewInsights, ReviewQuality, ReviewStatsView, ReviewsSummary,
};
pub use seller_info::{GetSellerInfo, SellerInfo};

use thiserror::Error;

use crate::adapters::{AdapterError, Adapters};
use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum UseCaseError {
    /// An adapter call failed.
    #[error("Error getting {concern}: {source}")]
    Fetch {
        concern: &'static str,
        #[source]
        source: AdapterError,
    },

    /// The request broke a business rule checked by the use case itself.
    #[error("Error getting {concern}: {reason}")]
    Rejected {
        concern: &'static str,
        reason: String,
    },
}

impl UseCaseError {
    pub(crate) fn rejected(concern: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            concern,
            reason: reason.into(),
        }
    }

    /// The service error at the bottom of the chain, if any.
    #[must_use]
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Fetch { source, .. } => Some(&source.source),
            Self::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.service_error(), Some(ServiceError::NotFound { .. }))
    }

    /// True when the caller sent something the marketplace or a business
    /// rule refused.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
            || matches!(self.service_error(), Some(ServiceError::Validation(_)))
    }
}

pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Tag adapter failures with the use-case concern.
trait ConcernContext<T> {
    fn concerning(self, concern: &'static str) -> UseCaseResult<T>;
}

impl<T> ConcernContext<T> for Result<T, AdapterError> {
    fn concerning(self, concern: &'static str) -> UseCaseResult<T> {
        self.map_err(|source| UseCaseError::Fetch { concern, source })
    }
}

/// Every use case, built over one set of adapters.
#[derive(Clone)]
pub struct UseCases {
    pub product_info: GetProductInfo,
    pub seller_info: GetSellerInfo,
    pub payment_methods: GetPaymentMethods,
    pub questions: GetProductQuestions,
    pub reviews: GetProductReviews,
    pub purchase: PurchaseProduct,
    pub navigation: GetNavigation,
    pub product_page: GetProductPage,
}

impl UseCases {
    #[must_use]
    pub fn new(adapters: &Adapters) -> Self {
        let product_info = GetProductInfo::new(
            adapters.product.clone(),
            adapters.gallery.clone(),
            adapters.specifications.clone(),
        );
        let seller_info = GetSellerInfo::new(adapters.seller.clone());
        let payment_methods = GetPaymentMethods::new(adapters.payment.clone());
        let questions = GetProductQuestions::new(adapters.questions.clone());
        let reviews = GetProductReviews::new(adapters.reviews.clone());
        let navigation = GetNavigation::new(adapters.navigation.clone());
        let product_page = GetProductPage::new(
            product_info.clone(),
            seller_info.clone(),
            reviews.clone(),
            questions.clone(),
            payment_methods.clone(),
            navigation.clone(),
        );
        Self {
            product_info,
            seller_info,
            payment_methods,
            questions,
            reviews,
            purchase: PurchaseProduct::new(adapters.purchase.clone(), adapters.product.clone()),
            navigation,
            product_page,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use vitrina_core::SiteId;

    use super::UseCases;
    use crate::adapters::{Adapters, testing::fixture_resolver};

    pub fn fixture_use_cases() -> UseCases {
        UseCases::new(&Adapters::new(&fixture_resolver(), SiteId::Mco))
    }
}
