//! Live backend: every capability answered by the marketplace REST API.
//!
//! Responses are decoded straight into the [`crate::marketplace`] records.
//! A `404` becomes [`ServiceError::NotFound`](super::ServiceError::NotFound);
//! anything else the client raises is passed through as `Transport`.

mod catalog;
mod commerce;
mod community;

use vitrina_core::{ItemId, SiteId};

use super::{NotFoundExt, ServiceError};
use crate::api::{ApiClient, endpoints};
use crate::marketplace::Item;

/// Marketplace API backend.
///
/// `site` is the home marketplace, used by operations whose input does not
/// name one (category prediction, pickup point lookups).
#[derive(Clone)]
pub struct LiveBackend {
    client: ApiClient,
    site: SiteId,
}

impl LiveBackend {
    #[must_use]
    pub const fn new(client: ApiClient, site: SiteId) -> Self {
        Self { client, site }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn fetch_item(&self, id: &ItemId) -> Result<Item, ServiceError> {
        self.client
            .get(&endpoints::item(id))
            .await
            .or_not_found("Product", id)
    }
}
