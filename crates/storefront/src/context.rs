//! Composition root.
//!
//! [`ContextBuilder`] wires configuration into both backends, the resolver,
//! every adapter and every use case. The resulting [`ServiceContext`] is the
//! only object handlers and tests need.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;
use vitrina_core::SiteId;

use crate::adapters::Adapters;
use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::fixtures::{FixtureBackend, FixtureError, FixtureStore, NetworkSimulator};
use crate::services::{DataSource, LiveBackend, ServiceResolver, ServiceSet};
use crate::usecases::UseCases;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to build API client: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// Everything built from one configuration.
#[derive(Clone)]
pub struct ServiceContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    site: SiteId,
    resolver: ServiceResolver,
    store: FixtureStore,
    client: ApiClient,
    adapters: Adapters,
    use_cases: UseCases,
}

impl ServiceContext {
    /// Context for `config` with the defaults of [`ContextBuilder`].
    ///
    /// # Errors
    ///
    /// See [`ContextBuilder::build`].
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ContextError> {
        ContextBuilder::new(config).build()
    }

    #[must_use]
    pub fn site(&self) -> SiteId {
        self.inner.site
    }

    #[must_use]
    pub fn resolver(&self) -> &ServiceResolver {
        &self.inner.resolver
    }

    #[must_use]
    pub fn data_source(&self) -> DataSource {
        self.inner.resolver.data_source()
    }

    /// Switch every later call to `source`. Calls already running finish on
    /// the backend they started with.
    pub fn set_data_source(&self, source: DataSource) {
        self.inner.resolver.set_data_source(source);
    }

    /// Fixture data shared by the fixture backend.
    #[must_use]
    pub fn fixture_store(&self) -> &FixtureStore {
        &self.inner.store
    }

    #[must_use]
    pub fn api_client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn adapters(&self) -> &Adapters {
        &self.inner.adapters
    }

    #[must_use]
    pub fn use_cases(&self) -> &UseCases {
        &self.inner.use_cases
    }
}

/// Builder for [`ServiceContext`].
///
/// Defaults come from the configuration: the data source from
/// `USE_MOCK_DATA`, the simulator from the mock settings, a freshly seeded
/// fixture store.
pub struct ContextBuilder<'a> {
    config: &'a StorefrontConfig,
    data_source: Option<DataSource>,
    store: Option<FixtureStore>,
    simulator: Option<NetworkSimulator>,
    retry_base_delay: Option<Duration>,
}

impl<'a> ContextBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a StorefrontConfig) -> Self {
        Self {
            config,
            data_source: None,
            store: None,
            simulator: None,
            retry_base_delay: None,
        }
    }

    #[must_use]
    pub const fn data_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    /// Share an existing store instead of seeding a new one.
    #[must_use]
    pub fn fixture_store(mut self, store: FixtureStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub const fn simulator(mut self, simulator: NetworkSimulator) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// Base delay of the API client's 429 backoff.
    #[must_use]
    pub const fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// # Errors
    ///
    /// Returns [`ContextError::Api`] for an unusable API base URL and
    /// [`ContextError::Fixture`] if the embedded fixtures fail to parse.
    pub fn build(self) -> Result<ServiceContext, ContextError> {
        let site = self.config.site_id();
        let client = match self.retry_base_delay {
            Some(delay) => ApiClient::with_retry_delay(&self.config.api, delay)?,
            None => ApiClient::new(&self.config.api)?,
        };
        let store = match self.store {
            Some(store) => store,
            None => FixtureStore::seeded()?,
        };
        let simulator = self
            .simulator
            .unwrap_or_else(|| NetworkSimulator::from_config(&self.config.mock));

        let live = ServiceSet::from_backend(Arc::new(LiveBackend::new(client.clone(), site)));
        let fixture = ServiceSet::from_backend(Arc::new(FixtureBackend::new(store.clone(), simulator, site)));
        let source = self
            .data_source
            .unwrap_or_else(|| DataSource::from_mock_flag(self.config.mock.enabled));
        let resolver = ServiceResolver::new(live, fixture, source);
        resolver.set_fixture_fallback(self.config.features.fallback_to_mock);

        let adapters = Adapters::new(&resolver, site);
        let use_cases = UseCases::new(&adapters);
        info!(
            %site,
            %source,
            fixture_fallback = resolver.fixture_fallback(),
            "Service context ready"
        );

        Ok(ServiceContext {
            inner: Arc::new(ContextInner {
                site,
                resolver,
                store,
                client,
                adapters,
                use_cases,
            }),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::ItemId;

    use super::*;
    use crate::config::Environment;

    fn testing_config() -> StorefrontConfig {
        StorefrontConfig::from_lookup(|key| match key {
            "APP_ENV" => Some(Environment::Testing.to_string()),
            "MOCK_DELAY_MS" => Some("0".to_owned()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_builds_fixture_context() {
        let context = ServiceContext::from_config(&testing_config()).unwrap();
        assert_eq!(context.data_source(), DataSource::Fixture);
        assert_eq!(context.site(), SiteId::Mco);

        let info = context
            .use_cases()
            .product_info
            .execute(&ItemId::new("MCO123456789"))
            .await
            .unwrap();
        assert_eq!(info.product.id.as_str(), "MCO123456789");
    }

    #[tokio::test]
    async fn test_shared_store_sees_writes() {
        let config = testing_config();
        let store = FixtureStore::seeded().unwrap();
        let first = ContextBuilder::new(&config)
            .fixture_store(store.clone())
            .simulator(NetworkSimulator::instant())
            .build()
            .unwrap();
        let second = ContextBuilder::new(&config)
            .fixture_store(store)
            .simulator(NetworkSimulator::instant())
            .build()
            .unwrap();

        let item = ItemId::new("MCO123456789");
        first
            .adapters()
            .questions
            .ask_question(&item, "¿Incluye cargador?", vitrina_core::UserId::new(9))
            .await
            .unwrap();
        let page = second
            .adapters()
            .questions
            .get_product_questions(&item, 10, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 6);
    }

    #[test]
    fn test_switch_data_source() {
        let context = ContextBuilder::new(&testing_config())
            .data_source(DataSource::Live)
            .build()
            .unwrap();
        assert_eq!(context.data_source(), DataSource::Live);
        context.set_data_source(DataSource::Fixture);
        assert_eq!(context.data_source(), DataSource::Fixture);
    }
}
