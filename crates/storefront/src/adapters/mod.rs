//! View-model adapters.
//!
//! Each adapter wraps one or two service capabilities and reshapes the raw
//! marketplace records into the camelCase JSON the product page consumes.
//! Missing display fields get safe placeholders here so use cases never deal
//! with absent data.
//!
//! Adapters read the active backend once per call from the
//! [`ServiceResolver`] they hold; a data-source switch never splits one
//! adapter call across backends.

mod gallery;
mod navigation;
mod payment;
mod product;
mod purchase;
mod questions;
mod reviews;
mod seller;
mod specifications;

pub use gallery::{GalleryAdapter, ImageView};
pub use navigation::{
    Breadcrumb, CategoryAttributeView, CategoryPathEntry, FilterValueView, NavigationAdapter,
};
pub use payment::{
    BankTransferView, CreditCardView, InstallmentView, PaymentAdapter, PaymentMethodView,
    PaymentMethodsView, ShippingMethodView,
};
pub use product::{
    AttributeView, InstallmentsView, PriceView, ProductAdapter, ProductShippingView, ProductView,
    RatingView, SellerRef, VariationView,
};
pub use purchase::{
    BuyerProtectionView, CartLineView, CartView, CheckoutView, DeliveryWindow, GuaranteeView,
    PurchaseAdapter, ReturnPolicyView, ShippingOptionView, StockView, TotalCost,
};
pub use questions::{
    AnswerView, AskerView, QuestionPageView, QuestionStatsView, QuestionView, QuestionsAdapter,
};
pub use reviews::{
    RatingSummaryView, ReviewAttributeView, ReviewImageView, ReviewPageView, ReviewVotes,
    ReviewView, ReviewerView, ReviewsAdapter,
};
pub use seller::{
    AddressView, EshopView, MetricsView, RateView, RatingsView, ReputationView, SalesView,
    SellerAdapter, SellerItemView, SellerItemsView, SellerStatusView, SellerView,
    TransactionsView,
};
pub use specifications::{
    DescriptionView, DimensionsView, HighlightView, SpecificationsAdapter, SpecificationsView,
    SpecView, TechnicalSpecGroupView, TechnicalSpecView,
};

use thiserror::Error;

use crate::services::{ServiceError, ServiceResolver, ServiceResult};

/// A service call failed; `operation` names what the adapter was fetching.
#[derive(Debug, Error)]
#[error("Error fetching {operation}: {source}")]
pub struct AdapterError {
    pub operation: &'static str,
    #[source]
    pub source: ServiceError,
}

impl AdapterError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.source, ServiceError::NotFound { .. })
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Unwrap a service payload, tagging failures with the adapter operation.
trait FetchContext<T> {
    fn fetching(self, operation: &'static str) -> AdapterResult<T>;
}

impl<T> FetchContext<T> for ServiceResult<T> {
    fn fetching(self, operation: &'static str) -> AdapterResult<T> {
        self.map(|payload| payload.data)
            .map_err(|source| AdapterError { operation, source })
    }
}

/// Every adapter, built over one resolver.
#[derive(Clone)]
pub struct Adapters {
    pub product: ProductAdapter,
    pub gallery: GalleryAdapter,
    pub seller: SellerAdapter,
    pub payment: PaymentAdapter,
    pub reviews: ReviewsAdapter,
    pub questions: QuestionsAdapter,
    pub navigation: NavigationAdapter,
    pub specifications: SpecificationsAdapter,
    pub purchase: PurchaseAdapter,
}

impl Adapters {
    #[must_use]
    pub fn new(services: &ServiceResolver, site: vitrina_core::SiteId) -> Self {
        Self {
            product: ProductAdapter::new(services.clone()),
            gallery: GalleryAdapter::new(services.clone()),
            seller: SellerAdapter::new(services.clone()),
            payment: PaymentAdapter::new(services.clone(), site),
            reviews: ReviewsAdapter::new(services.clone()),
            questions: QuestionsAdapter::new(services.clone()),
            navigation: NavigationAdapter::new(services.clone()),
            specifications: SpecificationsAdapter::new(services.clone()),
            purchase: PurchaseAdapter::new(services.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use vitrina_core::SiteId;

    use crate::fixtures::FixtureBackend;
    use crate::services::{DataSource, ServiceResolver, ServiceSet};

    /// Resolver whose both sides answer from one fresh, instant fixture store.
    #[allow(clippy::unwrap_used)]
    pub fn fixture_resolver() -> ServiceResolver {
        let backend = Arc::new(FixtureBackend::instant(SiteId::Mco).unwrap());
        let set = ServiceSet::from_backend(backend);
        ServiceResolver::new(set.clone(), set, DataSource::Fixture)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_operation() {
        let err = AdapterError {
            operation: "product info",
            source: ServiceError::not_found("Product", "MCO1"),
        };
        assert_eq!(
            err.to_string(),
            "Error fetching product info: Product with id MCO1 not found"
        );
        assert!(err.is_not_found());
    }
}
