use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrina_core::{CategoryId, ItemCondition, ItemId, PictureId, SellerId, SiteId, VariationId};

use super::{Paging, flexible_id};

/// A marketplace listing (`/items/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: ItemId,
    pub site_id: Option<SiteId>,
    pub title: String,
    pub subtitle: Option<String>,
    pub seller_id: SellerId,
    pub category_id: CategoryId,
    pub official_store_id: Option<u64>,
    pub price: Decimal,
    pub base_price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub currency_id: Option<String>,
    pub initial_quantity: Option<u32>,
    pub available_quantity: u32,
    pub sold_quantity: u32,
    pub condition: ItemCondition,
    pub permalink: Option<String>,
    pub thumbnail: Option<String>,
    pub secure_thumbnail: Option<String>,
    pub pictures: Vec<Picture>,
    /// Embedded descriptions; only fixture documents carry these.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<ItemDescription>,
    pub accepts_mercadopago: bool,
    pub shipping: Option<ItemShipping>,
    pub attributes: Vec<Attribute>,
    pub variations: Vec<Variation>,
    pub installments: Option<ItemInstallments>,
    /// Review summary, when the listing endpoint includes one.
    pub reviews: Option<ItemReviewSummary>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub warranty: Option<String>,
    pub technical_specifications: Vec<TechnicalSpecGroup>,
    pub highlights: Vec<Highlight>,
    pub dimensions: Option<PackageDimensions>,
    pub weight: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Item {
    /// Attribute by id (`BRAND`, `WIDTH`, ...).
    #[must_use]
    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.id == id)
    }

    /// Variation by id.
    #[must_use]
    pub fn variation(&self, id: &VariationId) -> Option<&Variation> {
        self.variations.iter().find(|variation| &variation.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Picture {
    pub id: Option<PictureId>,
    pub url: Option<String>,
    pub secure_url: Option<String>,
    pub size: Option<String>,
    pub max_size: Option<String>,
    pub alt_text: Option<String>,
}

impl Picture {
    /// HTTPS URL when present, else the plain one.
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        self.secure_url.as_deref().or(self.url.as_deref())
    }
}

/// `/items/{id}/description`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDescription {
    pub id: Option<String>,
    pub text: Option<String>,
    pub plain_text: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub snapshot: Option<DescriptionSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionSnapshot {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemShipping {
    pub mode: Option<String>,
    pub methods: Vec<ItemShippingMethod>,
    pub tags: Vec<String>,
    pub local_pick_up: bool,
    pub free_shipping: bool,
    pub logistic_type: Option<String>,
    pub store_pick_up: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemShippingMethod {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub cost: Option<Decimal>,
    pub currency_id: Option<String>,
    pub free_shipping: Option<FreeShipping>,
}

/// Free-shipping flag with the rule that grants it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeShipping {
    pub flag: bool,
    pub rule: Option<FreeShippingRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeShippingRule {
    pub free_mode: Option<String>,
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub value_id: Option<String>,
    pub value_name: Option<String>,
    pub value_struct: Option<ValueStruct>,
    pub values: Vec<AttributeValue>,
    pub attribute_group_id: Option<String>,
    pub attribute_group_name: Option<String>,
    pub relevance: Option<f64>,
}

impl Attribute {
    /// `value_name`, else the first listed value's name.
    #[must_use]
    pub fn display_value(&self) -> Option<&str> {
        self.value_name
            .as_deref()
            .or_else(|| self.values.first().and_then(|value| value.name.as_deref()))
    }
}

/// Numeric attribute value with its unit (`{"number": 15.6, "unit": "\""}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueStruct {
    pub number: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeValue {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variation {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: VariationId,
    pub price: Decimal,
    pub available_quantity: u32,
    pub sold_quantity: u32,
    pub attribute_combinations: Vec<AttributeCombination>,
    pub picture_ids: Vec<PictureId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeCombination {
    pub id: String,
    pub name: String,
    pub value_id: Option<String>,
    pub value_name: Option<String>,
}

/// Installment plan advertised on the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemInstallments {
    pub quantity: u32,
    pub amount: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemReviewSummary {
    pub rating_average: f64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSpecGroup {
    pub category: String,
    pub specifications: Vec<TechnicalSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSpec {
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Highlight {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub unit: Option<String>,
}

/// `/sites/{site}/search` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    pub site_id: Option<SiteId>,
    pub query: Option<String>,
    pub paging: Paging,
    pub results: Vec<Item>,
}

/// Search filters passed through as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub site: SiteId,
    pub category: Option<CategoryId>,
    pub limit: u32,
    pub offset: u32,
    pub extra: BTreeMap<String, String>,
}

impl SearchOptions {
    #[must_use]
    pub fn new(site: SiteId, limit: u32) -> Self {
        Self {
            site,
            limit,
            ..Self::default()
        }
    }
}

/// Listing specifications as the specifications service reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSpecs {
    pub attributes: Vec<Attribute>,
    pub technical_specifications: Vec<TechnicalSpecGroup>,
    pub highlights: Vec<Highlight>,
    pub warranty: Option<String>,
    pub dimensions: Option<PackageDimensions>,
    pub weight: Option<String>,
}

impl From<&Item> for ProductSpecs {
    fn from(item: &Item) -> Self {
        Self {
            attributes: item.attributes.clone(),
            technical_specifications: item.technical_specifications.clone(),
            highlights: item.highlights.clone(),
            warranty: item.warranty.clone(),
            dimensions: item.dimensions.clone(),
            weight: item.weight.clone(),
        }
    }
}

/// One measured dimension read from a listing attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: String,
    pub unit: Option<String>,
}

impl Measure {
    fn from_attribute(attr: &Attribute) -> Option<Self> {
        let value_struct = attr.value_struct.as_ref();
        let value = value_struct
            .and_then(|vs| vs.number)
            .map(|number| number.to_string())
            .or_else(|| attr.value_name.clone())?;
        Some(Self {
            value,
            unit: value_struct.and_then(|vs| vs.unit.clone()),
        })
    }
}

/// Physical dimensions taken from `WIDTH`/`HEIGHT`/`DEPTH`/`WEIGHT` attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDimensions {
    pub width: Option<Measure>,
    pub height: Option<Measure>,
    pub depth: Option<Measure>,
    pub weight: Option<Measure>,
}

impl ProductDimensions {
    /// `None` when the listing has none of the dimension attributes.
    #[must_use]
    pub fn from_item(item: &Item) -> Option<Self> {
        let measure = |id: &str| item.attribute(id).and_then(Measure::from_attribute);
        let dimensions = Self {
            width: measure("WIDTH"),
            height: measure("HEIGHT"),
            depth: measure("DEPTH"),
            weight: measure("WEIGHT"),
        };
        let any = dimensions.width.is_some()
            || dimensions.height.is_some()
            || dimensions.depth.is_some()
            || dimensions.weight.is_some();
        any.then_some(dimensions)
    }
}

/// A highlighted attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductHighlight {
    pub id: String,
    pub title: String,
    pub value: String,
}

impl ProductHighlight {
    /// Attributes in the `Destacados` group or with relevance above 0.8.
    #[must_use]
    pub fn from_item(item: &Item) -> Vec<Self> {
        item.attributes
            .iter()
            .filter(|attr| {
                attr.attribute_group_name.as_deref() == Some("Destacados")
                    || attr.relevance.is_some_and(|relevance| relevance > 0.8)
            })
            .map(|attr| {
                let value = attr.value_name.clone().unwrap_or_else(|| {
                    let vs = attr.value_struct.clone().unwrap_or_default();
                    format!(
                        "{} {}",
                        vs.number.map(|n| n.to_string()).unwrap_or_default(),
                        vs.unit.unwrap_or_default()
                    )
                    .trim()
                    .to_string()
                });
                Self {
                    id: attr.id.clone(),
                    title: attr.name.clone(),
                    value,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item_with(attributes: serde_json::Value) -> Item {
        serde_json::from_value(serde_json::json!({
            "id": "MCO1",
            "title": "Test",
            "price": 100,
            "attributes": attributes,
        }))
        .unwrap()
    }

    #[test]
    fn test_item_tolerates_sparse_documents() {
        let item = item_with(serde_json::json!([]));
        assert_eq!(item.id.as_str(), "MCO1");
        assert_eq!(item.condition, ItemCondition::NotSpecified);
        assert!(item.pictures.is_empty());
        assert!(item.shipping.is_none());
    }

    #[test]
    fn test_dimensions_prefer_numeric_struct() {
        let item = item_with(serde_json::json!([
            {"id": "WIDTH", "name": "Ancho", "value_name": "7.8 cm",
             "value_struct": {"number": 7.8, "unit": "cm"}},
            {"id": "WEIGHT", "name": "Peso", "value_name": "240 g"}
        ]));
        let dimensions = ProductDimensions::from_item(&item).unwrap();
        assert_eq!(dimensions.width.unwrap().value, "7.8");
        assert_eq!(dimensions.weight.unwrap().value, "240 g");
        assert!(dimensions.height.is_none());
        assert!(ProductDimensions::from_item(&item_with(serde_json::json!([]))).is_none());
    }

    #[test]
    fn test_highlights_by_group_or_relevance() {
        let item = item_with(serde_json::json!([
            {"id": "CHIP", "name": "Chip", "value_name": "A16", "attribute_group_name": "Destacados"},
            {"id": "SCREEN", "name": "Pantalla", "relevance": 0.9,
             "value_struct": {"number": 6.7, "unit": "\""}},
            {"id": "BRAND", "name": "Marca", "value_name": "Apple", "relevance": 0.5}
        ]));
        let highlights = ProductHighlight::from_item(&item);
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].value, "A16");
        assert_eq!(highlights[1].value, "6.7 \"");
    }
}
