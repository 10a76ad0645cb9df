use async_trait::async_trait;
use tracing::instrument;
use vitrina_core::{CategoryId, ItemId, SiteId};

use super::FixtureBackend;
use crate::marketplace::{
    Category, CategoryAttribute, CategoryRef, Item, ItemDescription, Paging, Picture,
    ProductDimensions, ProductHighlight, ProductSpecs, SearchOptions, SearchResults, SiteCategory,
    Trend, page,
};
use crate::services::{
    CategoryService, ImageService, Payload, ProductService, ServiceError, ServiceResult,
    SpecificationsService,
};

/// Words shorter than this are ignored when predicting a category.
const MIN_KEYWORD_LEN: usize = 3;

/// Trends reported per site.
const MAX_TRENDS: usize = 10;

#[async_trait]
impl ProductService for FixtureBackend {
    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_item(&self, id: &ItemId) -> ServiceResult<Item> {
        self.simulator.call("product", "get_item").await?;
        self.item(id).await.map(Payload::ok)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_item_description(&self, id: &ItemId) -> ServiceResult<ItemDescription> {
        self.simulator.call("product", "get_item_description").await?;
        let item = self.item(id).await?;
        item.descriptions
            .into_iter()
            .next()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Description", id))
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn get_items(&self, ids: &[ItemId]) -> ServiceResult<Vec<Item>> {
        self.simulator.call("product", "get_items").await?;
        let data = self.store.read().await;
        let items = ids.iter().filter_map(|id| data.item(id).cloned()).collect();
        Ok(Payload::ok(items))
    }

    #[instrument(skip(self, options), fields(site = %options.site))]
    async fn search(&self, query: &str, options: &SearchOptions) -> ServiceResult<SearchResults> {
        self.simulator.call("product", "search").await?;
        let needle = query.to_lowercase();
        let data = self.store.read().await;
        let matches: Vec<Item> = data
            .items
            .iter()
            .filter(|item| item.title.to_lowercase().contains(&needle))
            .filter(|item| options.category.as_ref().is_none_or(|c| &item.category_id == c))
            .cloned()
            .collect();

        Ok(Payload::ok(SearchResults {
            site_id: Some(options.site),
            query: Some(query.to_owned()),
            paging: Paging::new(matches.len() as u64, options.offset, options.limit),
            results: page(&matches, options.offset, options.limit),
        }))
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn related_items(&self, id: &ItemId, limit: u32) -> ServiceResult<Vec<Item>> {
        self.simulator.call("product", "related_items").await?;
        let data = self.store.read().await;
        let item = data.item(id).ok_or_else(|| ServiceError::not_found("Product", id))?;
        let related = data
            .items
            .iter()
            .filter(|candidate| candidate.category_id == item.category_id && &candidate.id != id)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Payload::ok(related))
    }
}

#[async_trait]
impl CategoryService for FixtureBackend {
    #[instrument(skip(self), fields(category_id = %id))]
    async fn get_category(&self, id: &CategoryId) -> ServiceResult<Category> {
        self.simulator.call("category", "get_category").await?;
        self.store
            .read()
            .await
            .category(id)
            .cloned()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Category", id))
    }

    #[instrument(skip(self), fields(category_id = %id))]
    async fn get_category_attributes(&self, id: &CategoryId) -> ServiceResult<Vec<CategoryAttribute>> {
        self.simulator.call("category", "get_category_attributes").await?;
        self.store
            .read()
            .await
            .category(id)
            .map(|category| Payload::ok(category.attributes.clone()))
            .ok_or_else(|| ServiceError::not_found("Category", id))
    }

    #[instrument(skip(self))]
    async fn get_site_categories(&self, site: SiteId) -> ServiceResult<Vec<SiteCategory>> {
        self.simulator.call("category", "get_site_categories").await?;
        let categories = self
            .store
            .read()
            .await
            .site_categories
            .get(&site)
            .cloned()
            .unwrap_or_default();
        Ok(Payload::ok(categories))
    }

    /// Categories whose name, or one of whose listings' titles, shares a
    /// keyword with `title`.
    #[instrument(skip(self))]
    async fn predict_category(&self, title: &str) -> ServiceResult<Vec<CategoryRef>> {
        self.simulator.call("category", "predict_category").await?;
        let keywords: Vec<String> = title
            .split_whitespace()
            .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
            .map(str::to_lowercase)
            .collect();
        let mentions = |text: &str| {
            let text = text.to_lowercase();
            keywords.iter().any(|keyword| text.contains(keyword.as_str()))
        };

        let data = self.store.read().await;
        let predicted = data
            .categories
            .iter()
            .filter(|category| {
                mentions(&category.name)
                    || data
                        .items
                        .iter()
                        .any(|item| item.category_id == category.id && mentions(&item.title))
            })
            .map(|category| CategoryRef {
                id: category.id.clone(),
                name: category.name.clone(),
                permalink: category.permalink.clone(),
                ..CategoryRef::default()
            })
            .collect();
        Ok(Payload::ok(predicted))
    }

    /// Subcategories of the site's top-level categories, in listing order.
    #[instrument(skip(self))]
    async fn get_trends(&self, site: SiteId) -> ServiceResult<Vec<Trend>> {
        self.simulator.call("category", "get_trends").await?;
        let data = self.store.read().await;
        let trends = data
            .site_categories
            .get(&site)
            .into_iter()
            .flatten()
            .flat_map(|top| top.children.iter())
            .take(MAX_TRENDS)
            .map(|child| Trend {
                keyword: child.name.clone(),
                url: Some(format!("/categoria/{}", child.id)),
            })
            .collect();
        Ok(Payload::ok(trends))
    }
}

#[async_trait]
impl ImageService for FixtureBackend {
    async fn get_item_pictures(&self, item: &ItemId) -> ServiceResult<Vec<Picture>> {
        self.simulator.call("image", "get_item_pictures").await?;
        Ok(Payload::ok(self.item(item).await?.pictures))
    }
}

#[async_trait]
impl SpecificationsService for FixtureBackend {
    async fn get_product_specs(&self, item: &ItemId) -> ServiceResult<ProductSpecs> {
        self.simulator.call("specifications", "get_product_specs").await?;
        let item = self.item(item).await?;
        Ok(Payload::ok(ProductSpecs::from(&item)))
    }

    async fn get_product_dimensions(&self, item: &ItemId) -> ServiceResult<Option<ProductDimensions>> {
        self.simulator.call("specifications", "get_product_dimensions").await?;
        let item = self.item(item).await?;
        Ok(Payload::ok(ProductDimensions::from_item(&item)))
    }

    async fn get_product_highlights(&self, item: &ItemId) -> ServiceResult<Vec<ProductHighlight>> {
        self.simulator.call("specifications", "get_product_highlights").await?;
        let item = self.item(item).await?;
        Ok(Payload::ok(ProductHighlight::from_item(&item)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::ImageSize;

    fn backend() -> FixtureBackend {
        FixtureBackend::instant(SiteId::Mco).unwrap()
    }

    #[tokio::test]
    async fn test_get_item_and_missing_item() {
        let backend = backend();
        let item = backend.get_item(&ItemId::new("MCO123456789")).await.unwrap();
        assert!(item.success);
        assert_eq!(item.data.id.as_str(), "MCO123456789");

        let err = backend.get_item(&ItemId::new("MCO000")).await.unwrap_err();
        assert_eq!(err.to_string(), "Product with id MCO000 not found");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_paged() {
        let backend = backend();
        let options = SearchOptions::new(SiteId::Mco, 10);
        let results = backend.search("IPHONE", &options).await.unwrap().data;
        assert_eq!(results.paging.total, 1);
        assert_eq!(results.results[0].id.as_str(), "MCO123456789");

        let mut options = SearchOptions::new(SiteId::Mco, 1);
        options.offset = 1;
        let results = backend.search("", &options).await.unwrap().data;
        assert_eq!(results.paging.total, 2);
        assert_eq!(results.results.len(), 1);
    }

    #[tokio::test]
    async fn test_related_items_exclude_the_item() {
        let backend = backend();
        let id = ItemId::new("MCO123456789");
        let related = backend.related_items(&id, 5).await.unwrap().data;
        assert!(related.iter().all(|item| item.id != id));
    }

    #[tokio::test]
    async fn test_description_comes_from_listing() {
        let description = backend()
            .get_item_description(&ItemId::new("MCO123456789"))
            .await
            .unwrap()
            .data;
        assert!(description.text.unwrap().contains("A16 Bionic"));
    }

    #[tokio::test]
    async fn test_category_lookups() {
        let backend = backend();
        let category = backend.get_category(&CategoryId::new("MCO1055")).await.unwrap().data;
        assert!(!category.path_from_root.is_empty());
        let attributes = backend
            .get_category_attributes(&CategoryId::new("MCO1055"))
            .await
            .unwrap()
            .data;
        assert!(attributes.iter().any(|attr| attr.id == "BRAND"));
        assert!(backend.get_category(&CategoryId::new("MCO0")).await.is_err());
    }

    #[tokio::test]
    async fn test_predict_category_from_listing_titles() {
        let predicted = backend().predict_category("iPhone 14 usado").await.unwrap().data;
        assert!(predicted.iter().any(|c| c.id.as_str() == "MCO1055"));
    }

    #[tokio::test]
    async fn test_trends_from_site_categories() {
        let backend = backend();
        let trends = backend.get_trends(SiteId::Mco).await.unwrap().data;
        assert!(trends.iter().any(|t| t.keyword == "Computación"));
        assert!(backend.get_trends(SiteId::Mlb).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn test_specifications_from_attributes() {
        let backend = backend();
        let id = ItemId::new("MCO123456789");
        let dimensions = backend.get_product_dimensions(&id).await.unwrap().data.unwrap();
        assert_eq!(dimensions.width.unwrap().value, "7.76");
        let highlights = backend.get_product_highlights(&id).await.unwrap().data;
        assert!(highlights.iter().any(|h| h.id == "PROCESSOR_MODEL"));
    }

    #[tokio::test]
    async fn test_pictures_and_optimized_urls() {
        let backend = backend();
        let pictures = backend
            .get_item_pictures(&ItemId::new("MCO123456789"))
            .await
            .unwrap()
            .data;
        let url = pictures[0].best_url().unwrap();
        let small = backend.optimize_image_url(url, ImageSize::Small);
        assert!(small.contains("-I."));
    }
}
