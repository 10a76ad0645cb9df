use serde::Serialize;
use tracing::instrument;
use vitrina_core::{CategoryId, ItemId};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{CategoryAttribute, CategoryRef};
use crate::services::{Payload, ServiceResolver};

/// One category on the way from the root to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPathEntry {
    pub id: CategoryId,
    pub name: String,
    pub permalink: Option<String>,
    pub url: String,
    pub level: u32,
}

impl CategoryPathEntry {
    fn new(index: usize, category: &CategoryRef) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            permalink: category.permalink.clone(),
            url: format!("/categoria/{}", category.id),
            level: category
                .level
                .unwrap_or_else(|| u32::try_from(index).unwrap_or(u32::MAX)),
        }
    }
}

/// A breadcrumb link. Category crumbs carry their id and level; the home and
/// product crumbs do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_current_page: bool,
}

impl Breadcrumb {
    fn home() -> Self {
        Self {
            id: None,
            name: "Inicio".to_owned(),
            url: "/".to_owned(),
            permalink: None,
            level: None,
            is_current_page: false,
        }
    }

    fn product(id: &ItemId, title: &str) -> Self {
        Self {
            id: None,
            name: title.to_owned(),
            url: format!("/producto/{id}"),
            permalink: None,
            level: None,
            is_current_page: true,
        }
    }
}

impl From<CategoryPathEntry> for Breadcrumb {
    fn from(entry: CategoryPathEntry) -> Self {
        Self {
            id: Some(entry.id),
            name: entry.name,
            url: entry.url,
            permalink: entry.permalink,
            level: Some(entry.level),
            is_current_page: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAttributeView {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub hierarchy: Option<String>,
    pub relevance: Option<u32>,
    pub required: bool,
    pub values: Vec<FilterValueView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterValueView {
    pub id: Option<String>,
    pub name: String,
    pub results: Option<u64>,
}

impl From<&CategoryAttribute> for CategoryAttributeView {
    fn from(attr: &CategoryAttribute) -> Self {
        Self {
            id: attr.id.clone(),
            name: attr.name.clone(),
            kind: attr.kind.clone(),
            hierarchy: attr.hierarchy.clone(),
            relevance: attr.relevance,
            required: attr.required,
            values: attr
                .values
                .iter()
                .map(|value| FilterValueView {
                    id: value.id.clone(),
                    name: value.name.clone(),
                    results: value.results,
                })
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct NavigationAdapter {
    services: ServiceResolver,
}

impl NavigationAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the category does not exist.
    #[instrument(skip(self), fields(category_id = %category))]
    pub async fn get_category_path(&self, category: &CategoryId) -> AdapterResult<Vec<CategoryPathEntry>> {
        let category = self
            .services
            .call(|services| services.category.get_category(category))
            .await
            .fetching("category path")?;
        Ok(category
            .path_from_root
            .iter()
            .enumerate()
            .map(|(index, entry)| CategoryPathEntry::new(index, entry))
            .collect())
    }

    /// `Inicio`, then the listing's category path, then the listing itself.
    ///
    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing or its category
    /// cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_product_breadcrumbs(&self, item: &ItemId) -> AdapterResult<Vec<Breadcrumb>> {
        // Both lookups go to the same backend.
        let (listing, category) = self
            .services
            .call(|services| async move {
                let listing = services.product.get_item(item).await?.data;
                let category = services.category.get_category(&listing.category_id).await?.data;
                Ok(Payload::ok((listing, category)))
            })
            .await
            .fetching("product breadcrumbs")?;

        let mut crumbs = Vec::with_capacity(category.path_from_root.len() + 2);
        crumbs.push(Breadcrumb::home());
        crumbs.extend(
            category
                .path_from_root
                .iter()
                .enumerate()
                .map(|(index, entry)| Breadcrumb::from(CategoryPathEntry::new(index, entry))),
        );
        crumbs.push(Breadcrumb::product(item, &listing.title));
        Ok(crumbs)
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the category does not exist.
    #[instrument(skip(self), fields(category_id = %category))]
    pub async fn get_category_attributes(
        &self,
        category: &CategoryId,
    ) -> AdapterResult<Vec<CategoryAttributeView>> {
        let attributes = self
            .services
            .call(|services| services.category.get_category_attributes(category))
            .await
            .fetching("category attributes")?;
        Ok(attributes.iter().map(CategoryAttributeView::from).collect())
    }
}
