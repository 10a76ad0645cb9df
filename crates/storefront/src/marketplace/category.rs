use serde::{Deserialize, Serialize};
use vitrina_core::CategoryId;

/// A category with its path from the root (`/categories/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub picture: Option<String>,
    pub permalink: Option<String>,
    pub total_items_in_this_category: Option<u64>,
    pub path_from_root: Vec<CategoryRef>,
    pub children_categories: Vec<CategoryRef>,
    pub attribute_types: Option<String>,
    /// Attribute definitions; only fixture documents embed these.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<CategoryAttribute>,
}

/// Id and name of a related category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items_in_this_category: Option<u64>,
}

/// Filterable attribute definition (`/categories/{id}/attributes`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryAttribute {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "value_type")]
    pub kind: Option<String>,
    pub hierarchy: Option<String>,
    pub relevance: Option<u32>,
    pub required: bool,
    pub values: Vec<CategoryAttributeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryAttributeValue {
    pub id: Option<String>,
    pub name: String,
    pub results: Option<u64>,
}

/// Top-level site category with its direct children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteCategory {
    pub id: CategoryId,
    pub name: String,
    pub children: Vec<CategoryRef>,
}

impl SiteCategory {
    #[must_use]
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id.clone(),
            name: self.name.clone(),
            ..CategoryRef::default()
        }
    }
}

/// A trending search keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trend {
    pub keyword: String,
    pub url: Option<String>,
}
