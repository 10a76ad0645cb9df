//! Fixture backend: every capability answered from an in-memory store.
//!
//! # Architecture
//!
//! - [`FixtureData`] is seeded from the JSON documents embedded at build time
//! - [`FixtureStore`] shares it behind a `tokio::sync::RwLock`; each operation
//!   takes the lock once, so writes are atomic per call
//! - [`NetworkSimulator`] runs before every read or write: it logs, waits the
//!   configured latency and may fail the call with
//!   [`ServiceError::Simulated`](crate::services::ServiceError::Simulated)
//!
//! Writes (questions, reviews, carts, orders) are visible to every later call
//! made through the same store. Tests build their own store.

mod catalog;
mod commerce;
mod community;
mod data;
mod simulator;
mod store;

pub use data::FixtureData;
pub use simulator::NetworkSimulator;
pub use store::FixtureStore;

use thiserror::Error;
use vitrina_core::{ItemId, SiteId};

use crate::marketplace::Item;
use crate::services::ServiceError;

/// Errors raised while seeding fixture data.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to parse fixture {name}: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Fixture implementation of every service trait.
#[derive(Clone)]
pub struct FixtureBackend {
    store: FixtureStore,
    simulator: NetworkSimulator,
    site: SiteId,
}

impl FixtureBackend {
    #[must_use]
    pub const fn new(store: FixtureStore, simulator: NetworkSimulator, site: SiteId) -> Self {
        Self {
            store,
            simulator,
            site,
        }
    }

    /// Seeded store, no latency, no simulated failures.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] if an embedded document fails to parse.
    pub fn instant(site: SiteId) -> Result<Self, FixtureError> {
        Ok(Self::new(FixtureStore::seeded()?, NetworkSimulator::instant(), site))
    }

    #[must_use]
    pub const fn store(&self) -> &FixtureStore {
        &self.store
    }

    async fn item(&self, id: &ItemId) -> Result<Item, ServiceError> {
        self.store
            .read()
            .await
            .item(id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use vitrina_core::UserId;

    use super::*;
    use crate::marketplace::ReviewDraft;
    use crate::services::{ProductService, PurchaseService, QuestionsService, ReviewsService};

    const IPHONE: &str = "MCO123456789";

    fn backend_with(simulator: NetworkSimulator) -> FixtureBackend {
        FixtureBackend::new(FixtureStore::seeded().unwrap(), simulator, SiteId::Mco)
    }

    #[tokio::test]
    async fn test_simulated_failure_leaves_store_untouched() {
        let backend = backend_with(NetworkSimulator::new(Some(Duration::ZERO), 1.0));
        let item = ItemId::new(IPHONE);
        let (questions, reviews, carts) = {
            let data = backend.store().read().await;
            (data.questions.clone(), data.reviews.clone(), data.carts.clone())
        };

        let draft = ReviewDraft {
            rating: 5,
            title: "Excelente".to_owned(),
            content: "Llegó rápido".to_owned(),
            user_id: "buyer_1".to_owned(),
            ..ReviewDraft::default()
        };
        let review = backend.create_review(&item, &draft).await;
        assert!(matches!(review, Err(ServiceError::Simulated)));
        let cart = backend.create_cart("buyer_1", &item, 1).await;
        assert!(matches!(cart, Err(ServiceError::Simulated)));
        let question = backend.ask_question(&item, "¿Tiene garantía?", UserId::new(42)).await;
        assert!(matches!(question, Err(ServiceError::Simulated)));

        let data = backend.store().read().await;
        assert_eq!(data.questions, questions);
        assert_eq!(data.reviews, reviews);
        assert_eq!(data.carts, carts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_wait_for_configured_delay() {
        let backend = backend_with(NetworkSimulator::new(Some(Duration::from_millis(500)), 0.0));
        let item = ItemId::new(IPHONE);
        let lookup = backend.get_item(&item);
        tokio::pin!(lookup);

        tokio::select! {
            biased;
            _ = &mut lookup => panic!("listing returned before the delay"),
            () = tokio::time::sleep(Duration::from_millis(499)) => {}
        }

        let listing = lookup.await.unwrap().data;
        assert_eq!(listing.id, item);
    }
}
