use serde::Serialize;
use tracing::instrument;
use vitrina_core::{ItemId, VariationId};

use super::{AdapterResult, FetchContext};
use crate::marketplace::Picture;
use crate::services::ServiceResolver;

/// One gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub id: String,
    pub url: String,
    pub alt: String,
    pub thumbnail: String,
    pub is_main: bool,
}

/// Thumbnail variant of a marketplace CDN URL; other URLs are returned as is.
fn thumbnail_url(url: &str) -> String {
    if url.contains("mlstatic.com") {
        url.replacen("-O.", "-I.", 1)
    } else {
        url.to_owned()
    }
}

fn to_images(pictures: &[Picture]) -> Vec<ImageView> {
    pictures
        .iter()
        .enumerate()
        .map(|(index, picture)| {
            let url = picture.best_url().unwrap_or_default().to_owned();
            ImageView {
                id: picture
                    .id
                    .as_ref()
                    .map_or_else(|| format!("img_{index}"), ToString::to_string),
                alt: picture
                    .alt_text
                    .clone()
                    .unwrap_or_else(|| format!("Imagen del producto {}", index + 1)),
                thumbnail: thumbnail_url(&url),
                url,
                is_main: index == 0,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct GalleryAdapter {
    services: ServiceResolver,
}

impl GalleryAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the pictures cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_product_images(&self, item: &ItemId) -> AdapterResult<Vec<ImageView>> {
        let pictures = self
            .services
            .call(|services| services.image.get_item_pictures(item))
            .await
            .fetching("product images")?;
        Ok(to_images(&pictures))
    }

    /// Pictures the variation references, in listing order. Empty when the
    /// variation does not exist or references none.
    ///
    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item, variation_id = %variation))]
    pub async fn get_variation_images(
        &self,
        item: &ItemId,
        variation: &VariationId,
    ) -> AdapterResult<Vec<ImageView>> {
        let listing = self
            .services
            .call(|services| services.product.get_item(item))
            .await
            .fetching("variation images")?;
        let Some(variation) = listing.variation(variation) else {
            return Ok(Vec::new());
        };
        let pictures: Vec<Picture> = listing
            .pictures
            .iter()
            .filter(|picture| {
                picture
                    .id
                    .as_ref()
                    .is_some_and(|id| variation.picture_ids.contains(id))
            })
            .cloned()
            .collect();
        Ok(to_images(&pictures))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::testing::fixture_resolver;

    #[test]
    fn test_placeholders_and_thumbnails() {
        let pictures = vec![
            Picture {
                url: Some("https://http2.mlstatic.com/D_1-O.jpg".to_owned()),
                ..Picture::default()
            },
            Picture {
                url: Some("https://cdn.example.com/a-O.jpg".to_owned()),
                alt_text: Some("Frente".to_owned()),
                ..Picture::default()
            },
        ];
        let images = to_images(&pictures);
        assert_eq!(images[0].id, "img_0");
        assert_eq!(images[0].alt, "Imagen del producto 1");
        assert_eq!(images[0].thumbnail, "https://http2.mlstatic.com/D_1-I.jpg");
        assert!(images[0].is_main);
        assert_eq!(images[1].thumbnail, "https://cdn.example.com/a-O.jpg");
        assert_eq!(images[1].alt, "Frente");
        assert!(!images[1].is_main);
    }

    #[tokio::test]
    async fn test_fixture_images_match_picture_count() {
        let resolver = fixture_resolver();
        let id = ItemId::new("MCO123456789");
        let item = resolver.current().product.get_item(&id).await.unwrap().data;
        let images = GalleryAdapter::new(resolver).get_product_images(&id).await.unwrap();
        assert_eq!(images.len(), item.pictures.len());
        assert_eq!(images.iter().filter(|image| image.is_main).count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_variation_has_no_images() {
        let images = GalleryAdapter::new(fixture_resolver())
            .get_variation_images(&ItemId::new("MCO123456789"), &VariationId::new("none"))
            .await
            .unwrap();
        assert!(images.is_empty());
    }
}
