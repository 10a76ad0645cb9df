use async_trait::async_trait;
use vitrina_core::ItemId;

use super::ServiceResult;
use crate::marketplace::{Item, ItemDescription, SearchOptions, SearchResults};

/// Listings and their descriptions.
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn get_item(&self, id: &ItemId) -> ServiceResult<Item>;

    async fn get_item_description(&self, id: &ItemId) -> ServiceResult<ItemDescription>;

    /// Listings for several ids; unknown ids are skipped.
    async fn get_items(&self, ids: &[ItemId]) -> ServiceResult<Vec<Item>>;

    async fn search(&self, query: &str, options: &SearchOptions) -> ServiceResult<SearchResults>;

    /// Listings from the same category, excluding `id` itself.
    async fn related_items(&self, id: &ItemId, limit: u32) -> ServiceResult<Vec<Item>>;
}
