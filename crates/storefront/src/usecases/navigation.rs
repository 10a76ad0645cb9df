use std::collections::BTreeMap;

use serde::Serialize;
use tracing::instrument;
use vitrina_core::{CategoryId, ItemId};

use super::{ConcernContext, UseCaseResult};
use crate::adapters::{Breadcrumb, CategoryAttributeView, NavigationAdapter};

const PRIMARY_FILTERS: [&str; 4] = ["COLOR", "BRAND", "MODEL", "SIZE"];
const TECHNICAL_FILTERS: [&str; 4] = ["PROCESSOR", "MEMORY", "STORAGE", "SCREEN_SIZE"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub breadcrumbs: Vec<Breadcrumb>,
    pub current_page: Option<Breadcrumb>,
    /// Category crumbs only: no home link, no current page.
    pub category_path: Vec<Breadcrumb>,
    pub structured: StructuredBreadcrumbs,
}

/// schema.org `BreadcrumbList` for JSON-LD embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredBreadcrumbs {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "itemListElement")]
    pub item_list_element: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub position: usize,
    pub name: String,
    pub item: String,
}

impl StructuredBreadcrumbs {
    /// Item urls are prefixed with `origin` when given, relative otherwise.
    #[must_use]
    pub fn new(breadcrumbs: &[Breadcrumb], origin: Option<&str>) -> Self {
        let origin = origin.map_or("", |origin| origin.trim_end_matches('/'));
        Self {
            context: "https://schema.org",
            kind: "BreadcrumbList",
            item_list_element: breadcrumbs
                .iter()
                .enumerate()
                .map(|(index, crumb)| ListItem {
                    kind: "ListItem",
                    position: index + 1,
                    name: crumb.name.clone(),
                    item: format!("{origin}{}", crumb.url),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilters {
    pub attributes: Vec<CategoryAttributeView>,
    pub filter_groups: FilterGroups,
    /// Attributes with selectable values, keyed by attribute id.
    pub available_filters: BTreeMap<String, AvailableFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterGroups {
    pub primary: Vec<CategoryAttributeView>,
    pub technical: Vec<CategoryAttributeView>,
    pub price: Vec<CategoryAttributeView>,
    pub other: Vec<CategoryAttributeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableFilter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub id: Option<String>,
    pub name: String,
    pub count: u64,
}

fn group_filters(attributes: &[CategoryAttributeView]) -> FilterGroups {
    let mut groups = FilterGroups::default();
    for attr in attributes {
        let id = attr.id.as_str();
        let group = if PRIMARY_FILTERS.contains(&id) {
            &mut groups.primary
        } else if TECHNICAL_FILTERS.contains(&id) {
            &mut groups.technical
        } else if id == "PRICE" {
            &mut groups.price
        } else {
            &mut groups.other
        };
        group.push(attr.clone());
    }
    groups
}

fn available_filters(attributes: &[CategoryAttributeView]) -> BTreeMap<String, AvailableFilter> {
    attributes
        .iter()
        .filter(|attr| !attr.values.is_empty())
        .map(|attr| {
            let filter = AvailableFilter {
                name: attr.name.clone(),
                kind: attr.kind.clone(),
                options: attr
                    .values
                    .iter()
                    .map(|value| FilterOption {
                        id: value.id.clone(),
                        name: value.name.clone(),
                        count: value.results.unwrap_or(0),
                    })
                    .collect(),
            };
            (attr.id.clone(), filter)
        })
        .collect()
}

#[derive(Clone)]
pub struct GetNavigation {
    navigation: NavigationAdapter,
    origin: Option<String>,
}

impl GetNavigation {
    #[must_use]
    pub const fn new(navigation: NavigationAdapter) -> Self {
        Self {
            navigation,
            origin: None,
        }
    }

    /// Absolute JSON-LD urls under `origin` (e.g. `https://tienda.example`).
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// # Errors
    ///
    /// Fails when the listing or its category cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn execute(&self, item: &ItemId) -> UseCaseResult<Navigation> {
        let breadcrumbs = self
            .navigation
            .get_product_breadcrumbs(item)
            .await
            .concerning("navigation")?;

        Ok(Navigation {
            current_page: breadcrumbs
                .iter()
                .find(|crumb| crumb.is_current_page)
                .cloned(),
            category_path: breadcrumbs
                .iter()
                .filter(|crumb| !crumb.is_current_page && crumb.url != "/")
                .cloned()
                .collect(),
            structured: StructuredBreadcrumbs::new(&breadcrumbs, self.origin.as_deref()),
            breadcrumbs,
        })
    }

    /// # Errors
    ///
    /// Fails when the category does not exist.
    #[instrument(skip(self), fields(category_id = %category))]
    pub async fn category_filters(&self, category: &CategoryId) -> UseCaseResult<CategoryFilters> {
        let attributes = self
            .navigation
            .get_category_attributes(category)
            .await
            .concerning("category filters")?;
        Ok(CategoryFilters {
            filter_groups: group_filters(&attributes),
            available_filters: available_filters(&attributes),
            attributes,
        })
    }
}
