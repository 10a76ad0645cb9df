use async_trait::async_trait;
use vitrina_core::{CategoryId, SiteId};

use super::ServiceResult;
use crate::marketplace::{Category, CategoryAttribute, CategoryRef, SiteCategory, Trend};

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn get_category(&self, id: &CategoryId) -> ServiceResult<Category>;

    async fn get_category_attributes(&self, id: &CategoryId) -> ServiceResult<Vec<CategoryAttribute>>;

    async fn get_site_categories(&self, site: SiteId) -> ServiceResult<Vec<SiteCategory>>;

    /// Categories that best match a listing title, on the backend's home site.
    async fn predict_category(&self, title: &str) -> ServiceResult<Vec<CategoryRef>>;

    async fn get_trends(&self, site: SiteId) -> ServiceResult<Vec<Trend>>;
}
