//! Backend selection.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    CategoryService, ImageService, PaymentService, ProductService, PurchaseService,
    QuestionsService, ReviewsService, SellerService, ServiceError, ServiceResult, ShippingService,
    SpecificationsService,
};

/// Where service calls are answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fixture,
}

impl DataSource {
    #[must_use]
    pub const fn from_mock_flag(use_mock_data: bool) -> Self {
        if use_mock_data { Self::Fixture } else { Self::Live }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fixture => "fixture",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "fixture" | "mock" => Ok(Self::Fixture),
            _ => Err(format!("invalid data source: {s}")),
        }
    }
}

/// One backend seen through every capability trait.
#[derive(Clone)]
pub struct ServiceSet {
    pub product: Arc<dyn ProductService>,
    pub seller: Arc<dyn SellerService>,
    pub payment: Arc<dyn PaymentService>,
    pub questions: Arc<dyn QuestionsService>,
    pub reviews: Arc<dyn ReviewsService>,
    pub category: Arc<dyn CategoryService>,
    pub purchase: Arc<dyn PurchaseService>,
    pub shipping: Arc<dyn ShippingService>,
    pub image: Arc<dyn ImageService>,
    pub specifications: Arc<dyn SpecificationsService>,
}

impl ServiceSet {
    /// Expose a backend that implements every capability.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProductService
            + SellerService
            + PaymentService
            + QuestionsService
            + ReviewsService
            + CategoryService
            + PurchaseService
            + ShippingService
            + ImageService
            + SpecificationsService
            + 'static,
    {
        Self {
            product: backend.clone(),
            seller: backend.clone(),
            payment: backend.clone(),
            questions: backend.clone(),
            reviews: backend.clone(),
            category: backend.clone(),
            purchase: backend.clone(),
            shipping: backend.clone(),
            image: backend.clone(),
            specifications: backend,
        }
    }
}

/// Holds both backends and the active [`DataSource`].
///
/// Callers go through [`ServiceResolver::call`], which reads the source once
/// per operation and uses that set for the whole call, so a switch mid-call
/// never splits one operation across backends.
#[derive(Clone)]
pub struct ServiceResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    live: ServiceSet,
    fixture: ServiceSet,
    use_fixture: AtomicBool,
    fixture_fallback: AtomicBool,
}

impl ServiceResolver {
    #[must_use]
    pub fn new(live: ServiceSet, fixture: ServiceSet, source: DataSource) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                live,
                fixture,
                use_fixture: AtomicBool::new(source == DataSource::Fixture),
                fixture_fallback: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn data_source(&self) -> DataSource {
        DataSource::from_mock_flag(self.inner.use_fixture.load(Ordering::Acquire))
    }

    pub fn set_data_source(&self, source: DataSource) {
        let previous = self
            .inner
            .use_fixture
            .swap(source == DataSource::Fixture, Ordering::AcqRel);
        if previous != (source == DataSource::Fixture) {
            info!(%source, "Data source switched");
        }
    }

    /// Retry live calls that fail in transport against the fixture backend.
    pub fn set_fixture_fallback(&self, enabled: bool) {
        self.inner.fixture_fallback.store(enabled, Ordering::Release);
    }

    #[must_use]
    pub fn fixture_fallback(&self) -> bool {
        self.inner.fixture_fallback.load(Ordering::Acquire)
    }

    /// Run `op` against the active backend.
    ///
    /// With the fixture fallback on, a live call that fails with
    /// [`ServiceError::Transport`] is run once more against the fixtures.
    /// Every other error is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the error of the last backend that ran `op`.
    pub async fn call<'s, T, F, Fut>(&'s self, op: F) -> ServiceResult<T>
    where
        F: Fn(&'s ServiceSet) -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let source = self.data_source();
        match op(self.for_source(source)).await {
            Err(ServiceError::Transport(err)) if source == DataSource::Live && self.fixture_fallback() => {
                warn!(error = %err, "Live call failed, answering from fixtures");
                op(self.for_source(DataSource::Fixture)).await
            }
            result => result,
        }
    }

    /// Services of the active backend.
    #[must_use]
    pub fn current(&self) -> &ServiceSet {
        self.for_source(self.data_source())
    }

    #[must_use]
    pub fn for_source(&self, source: DataSource) -> &ServiceSet {
        match source {
            DataSource::Live => &self.inner.live,
            DataSource::Fixture => &self.inner.fixture,
        }
    }
}
