use async_trait::async_trait;
use vitrina_core::ItemId;

use super::ServiceResult;
use crate::marketplace::{ProductDimensions, ProductHighlight, ProductSpecs};

/// Technical data read off a listing.
#[async_trait]
pub trait SpecificationsService: Send + Sync {
    async fn get_product_specs(&self, item: &ItemId) -> ServiceResult<ProductSpecs>;

    /// `None` when the listing has no dimension attributes.
    async fn get_product_dimensions(&self, item: &ItemId) -> ServiceResult<Option<ProductDimensions>>;

    async fn get_product_highlights(&self, item: &ItemId) -> ServiceResult<Vec<ProductHighlight>>;
}
