//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::context::{ContextError, ServiceContext};
use crate::usecases::UseCases;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the service
/// context built from it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    context: ServiceContext,
}

impl AppState {
    /// Create state with a context built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service context cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ContextError> {
        let context = ServiceContext::from_config(&config)?;
        Ok(Self::with_context(config, context))
    }

    /// Create state around an existing context.
    #[must_use]
    pub fn with_context(config: StorefrontConfig, context: ServiceContext) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, context }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn context(&self) -> &ServiceContext {
        &self.inner.context
    }

    #[must_use]
    pub fn use_cases(&self) -> &UseCases {
        self.inner.context.use_cases()
    }
}
