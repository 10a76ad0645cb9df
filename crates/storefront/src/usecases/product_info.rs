use std::collections::BTreeMap;

use serde::Serialize;
use tracing::instrument;
use vitrina_core::{ItemId, VariationId};

use super::{ConcernContext, UseCaseResult};
use crate::adapters::{
    GalleryAdapter, HighlightView, ImageView, ProductAdapter, ProductView, SpecView,
    SpecificationsAdapter, VariationView,
};

const CONCERN: &str = "product information";

/// Product header merged with its gallery and specifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    #[serde(flatten)]
    pub product: ProductView,
    pub images: Vec<ImageView>,
    /// General specifications keyed by attribute group.
    pub specifications: BTreeMap<String, Vec<SpecView>>,
    pub highlights: Vec<HighlightView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_variation: Option<VariationView>,
}

#[derive(Clone)]
pub struct GetProductInfo {
    product: ProductAdapter,
    gallery: GalleryAdapter,
    specifications: SpecificationsAdapter,
}

impl GetProductInfo {
    #[must_use]
    pub const fn new(
        product: ProductAdapter,
        gallery: GalleryAdapter,
        specifications: SpecificationsAdapter,
    ) -> Self {
        Self {
            product,
            gallery,
            specifications,
        }
    }

    /// # Errors
    ///
    /// Fails when the listing, its pictures or its specifications cannot be
    /// fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn execute(&self, item: &ItemId) -> UseCaseResult<ProductInfo> {
        let mut product = self.product.get_product_info(item).await.concerning(CONCERN)?;
        let images = self.gallery.get_product_images(item).await.concerning(CONCERN)?;
        let specs = self
            .specifications
            .get_product_specifications(item)
            .await
            .concerning(CONCERN)?;

        if specs.warranty.is_some() {
            product.warranty = specs.warranty;
        }
        Ok(ProductInfo {
            product,
            images,
            specifications: specs.general_specs,
            highlights: specs.highlights,
            selected_variation: None,
        })
    }

    /// Like [`Self::execute`], with the variation's pictures, price and stock
    /// taking over when it exists. An unknown variation leaves the product
    /// untouched.
    ///
    /// # Errors
    ///
    /// Fails when any of the underlying fetches fails.
    #[instrument(skip(self), fields(item_id = %item, variation_id = %variation))]
    pub async fn execute_with_variation(
        &self,
        item: &ItemId,
        variation: &VariationId,
    ) -> UseCaseResult<ProductInfo> {
        let mut info = self.execute(item).await?;
        let Some(selected) = info
            .product
            .variations
            .iter()
            .find(|candidate| &candidate.id == variation)
            .cloned()
        else {
            return Ok(info);
        };

        let images = self
            .gallery
            .get_variation_images(item, variation)
            .await
            .concerning(CONCERN)?;
        if !images.is_empty() {
            info.images = images;
        }
        if !selected.price.is_zero() {
            info.product.price.amount = selected.price;
        }
        if selected.available_quantity > 0 {
            info.product.available_quantity = selected.available_quantity;
        }
        info.selected_variation = Some(selected);
        Ok(info)
    }

    /// Other listings from the item's category.
    ///
    /// # Errors
    ///
    /// Fails when the listing or the category search fails.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn related(&self, item: &ItemId, limit: u32) -> UseCaseResult<Vec<ProductView>> {
        self.product
            .get_related_products(item, limit)
            .await
            .concerning("related products")
    }
}
