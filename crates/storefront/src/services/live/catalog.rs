use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use vitrina_core::{CategoryId, ItemId, SiteId};

use super::LiveBackend;
use crate::api::{ApiError, endpoints};
use crate::marketplace::{
    Category, CategoryAttribute, CategoryRef, Item, ItemDescription, Picture, ProductDimensions,
    ProductHighlight, ProductSpecs, SearchOptions, SearchResults, SiteCategory, Trend,
};
use crate::services::{
    CategoryService, ImageService, NotFoundExt, Payload, ProductService, ServiceResult,
    SpecificationsService,
};

/// One entry of a multi-get (`/items?ids=`) response.
#[derive(Debug, Deserialize)]
struct MultiGetEntry {
    code: u16,
    body: Value,
}

#[derive(Debug, Deserialize)]
struct PredictedCategory {
    #[serde(alias = "id")]
    category_id: CategoryId,
    #[serde(alias = "name")]
    category_name: String,
}

#[async_trait]
impl ProductService for LiveBackend {
    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_item(&self, id: &ItemId) -> ServiceResult<Item> {
        self.fetch_item(id).await.map(Payload::ok)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_item_description(&self, id: &ItemId) -> ServiceResult<ItemDescription> {
        self.client
            .get(&endpoints::item_description(id))
            .await
            .or_not_found("Description", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn get_items(&self, ids: &[ItemId]) -> ServiceResult<Vec<Item>> {
        if ids.is_empty() {
            return Ok(Payload::ok(Vec::new()));
        }
        let entries: Vec<MultiGetEntry> = self.client.get(&endpoints::items(ids)).await?;
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.code == 200 {
                let item = serde_json::from_value(entry.body).map_err(ApiError::from)?;
                items.push(item);
            } else {
                debug!(code = entry.code, "Skipping multi-get entry");
            }
        }
        Ok(Payload::ok(items))
    }

    #[instrument(skip(self, options), fields(site = %options.site))]
    async fn search(&self, query: &str, options: &SearchOptions) -> ServiceResult<SearchResults> {
        let results = self.client.get(&endpoints::search(query, options)).await?;
        Ok(Payload::ok(results))
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn related_items(&self, id: &ItemId, limit: u32) -> ServiceResult<Vec<Item>> {
        let item = self.fetch_item(id).await?;
        let mut options = SearchOptions::new(
            item.site_id.or_else(|| SiteId::from_item_id(id.as_str())).unwrap_or(self.site),
            limit.saturating_add(1),
        );
        options.category = Some(item.category_id);
        let results: SearchResults = self.client.get(&endpoints::search("", &options)).await?;
        let related = results
            .results
            .into_iter()
            .filter(|candidate| &candidate.id != id)
            .take(limit as usize)
            .collect();
        Ok(Payload::ok(related))
    }
}

#[async_trait]
impl CategoryService for LiveBackend {
    #[instrument(skip(self), fields(category_id = %id))]
    async fn get_category(&self, id: &CategoryId) -> ServiceResult<Category> {
        self.client
            .get(&endpoints::category(id))
            .await
            .or_not_found("Category", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(category_id = %id))]
    async fn get_category_attributes(&self, id: &CategoryId) -> ServiceResult<Vec<CategoryAttribute>> {
        self.client
            .get(&endpoints::category_attributes(id))
            .await
            .or_not_found("Category", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self))]
    async fn get_site_categories(&self, site: SiteId) -> ServiceResult<Vec<SiteCategory>> {
        let categories = self.client.get(&endpoints::site_categories(site)).await?;
        Ok(Payload::ok(categories))
    }

    #[instrument(skip(self))]
    async fn predict_category(&self, title: &str) -> ServiceResult<Vec<CategoryRef>> {
        let predicted: Vec<PredictedCategory> = self
            .client
            .get(&endpoints::category_predictor(self.site, title))
            .await?;
        let refs = predicted
            .into_iter()
            .map(|p| CategoryRef {
                id: p.category_id,
                name: p.category_name,
                ..CategoryRef::default()
            })
            .collect();
        Ok(Payload::ok(refs))
    }

    #[instrument(skip(self))]
    async fn get_trends(&self, site: SiteId) -> ServiceResult<Vec<Trend>> {
        let trends = self.client.get(&endpoints::trends(site)).await?;
        Ok(Payload::ok(trends))
    }
}

#[async_trait]
impl ImageService for LiveBackend {
    async fn get_item_pictures(&self, item: &ItemId) -> ServiceResult<Vec<Picture>> {
        let item = self.fetch_item(item).await?;
        Ok(Payload::ok(item.pictures))
    }
}

#[async_trait]
impl SpecificationsService for LiveBackend {
    async fn get_product_specs(&self, item: &ItemId) -> ServiceResult<ProductSpecs> {
        let item = self.fetch_item(item).await?;
        Ok(Payload::ok(ProductSpecs::from(&item)))
    }

    async fn get_product_dimensions(&self, item: &ItemId) -> ServiceResult<Option<ProductDimensions>> {
        let item = self.fetch_item(item).await?;
        Ok(Payload::ok(ProductDimensions::from_item(&item)))
    }

    async fn get_product_highlights(&self, item: &ItemId) -> ServiceResult<Vec<ProductHighlight>> {
        let item = self.fetch_item(item).await?;
        Ok(Payload::ok(ProductHighlight::from_item(&item)))
    }
}
