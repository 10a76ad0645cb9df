use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::ItemId;

use super::{AdapterResult, FetchContext};
use crate::marketplace::{Attribute, ItemDescription, PackageDimensions, ProductSpecs};
use crate::services::ServiceResolver;

const DEFAULT_GROUP: &str = "General";
const DEFAULT_UNIT: &str = "cm";

/// Specifications grouped for the product detail tabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationsView {
    /// Attributes keyed by their group name.
    pub general_specs: BTreeMap<String, Vec<SpecView>>,
    pub technical_specs: Vec<TechnicalSpecGroupView>,
    pub highlights: Vec<HighlightView>,
    pub warranty: Option<String>,
    pub dimensions: Option<DimensionsView>,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecView {
    pub id: String,
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalSpecGroupView {
    pub category: String,
    pub specifications: Vec<TechnicalSpecView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalSpecView {
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightView {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionsView {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionView {
    pub plain_text: Option<String>,
    pub html: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

fn spec_value(attr: &Attribute) -> String {
    if let Some(name) = &attr.value_name {
        return name.clone();
    }
    match attr.value_struct.as_ref() {
        Some(vs) => match vs.number {
            Some(number) => format!("{number}{}", vs.unit.as_deref().unwrap_or_default()),
            None => vs.unit.clone().unwrap_or_else(|| "No especificado".to_owned()),
        },
        None => "No especificado".to_owned(),
    }
}

fn group_attributes(attributes: &[Attribute]) -> BTreeMap<String, Vec<SpecView>> {
    let mut groups: BTreeMap<String, Vec<SpecView>> = BTreeMap::new();
    for attr in attributes {
        let group = attr
            .attribute_group_name
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP.to_owned());
        groups.entry(group).or_default().push(SpecView {
            id: attr.id.clone(),
            name: attr.name.clone(),
            value: spec_value(attr),
            unit: attr.value_struct.as_ref().and_then(|vs| vs.unit.clone()),
        });
    }
    groups
}

impl From<&PackageDimensions> for DimensionsView {
    fn from(dimensions: &PackageDimensions) -> Self {
        Self {
            width: dimensions.width,
            height: dimensions.height,
            depth: dimensions.depth,
            unit: dimensions
                .unit
                .clone()
                .unwrap_or_else(|| DEFAULT_UNIT.to_owned()),
        }
    }
}

impl From<&ProductSpecs> for SpecificationsView {
    fn from(specs: &ProductSpecs) -> Self {
        Self {
            general_specs: group_attributes(&specs.attributes),
            technical_specs: specs
                .technical_specifications
                .iter()
                .map(|group| TechnicalSpecGroupView {
                    category: group.category.clone(),
                    specifications: group
                        .specifications
                        .iter()
                        .map(|spec| TechnicalSpecView {
                            name: spec.name.clone(),
                            value: spec.value.clone(),
                            unit: spec.unit.clone(),
                        })
                        .collect(),
                })
                .collect(),
            highlights: specs
                .highlights
                .iter()
                .map(|highlight| HighlightView {
                    title: highlight.title.clone(),
                    description: highlight.description.clone(),
                    icon: highlight.icon.clone(),
                })
                .collect(),
            warranty: specs.warranty.clone(),
            dimensions: specs.dimensions.as_ref().map(DimensionsView::from),
            weight: specs.weight.clone(),
        }
    }
}

impl From<ItemDescription> for DescriptionView {
    fn from(description: ItemDescription) -> Self {
        Self {
            plain_text: description.plain_text,
            html: description.text,
            last_updated: description.last_updated,
        }
    }
}

#[derive(Clone)]
pub struct SpecificationsAdapter {
    services: ServiceResolver,
}

impl SpecificationsAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_product_specifications(&self, item: &ItemId) -> AdapterResult<SpecificationsView> {
        let specs = self
            .services
            .call(|services| services.specifications.get_product_specs(item))
            .await
            .fetching("product specifications")?;
        Ok(SpecificationsView::from(&specs))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing has no description.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_product_description(&self, item: &ItemId) -> AdapterResult<DescriptionView> {
        let description = self
            .services
            .call(|services| services.product.get_item_description(item))
            .await
            .fetching("product description")?;
        Ok(DescriptionView::from(description))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::marketplace::ValueStruct;

    #[test]
    fn test_value_fallbacks() {
        let named = Attribute {
            value_name: Some("Apple".to_owned()),
            ..Attribute::default()
        };
        let measured = Attribute {
            value_struct: Some(ValueStruct {
                number: Some(6.7),
                unit: Some("\"".to_owned()),
            }),
            ..Attribute::default()
        };
        assert_eq!(spec_value(&named), "Apple");
        assert_eq!(spec_value(&measured), "6.7\"");
        assert_eq!(spec_value(&Attribute::default()), "No especificado");
    }

    #[test]
    fn test_ungrouped_attributes_land_in_general() {
        let attributes = vec![
            Attribute {
                id: "BRAND".to_owned(),
                ..Attribute::default()
            },
            Attribute {
                id: "WIDTH".to_owned(),
                attribute_group_name: Some("Dimensiones".to_owned()),
                ..Attribute::default()
            },
        ];
        let groups = group_attributes(&attributes);
        assert_eq!(groups["General"][0].id, "BRAND");
        assert_eq!(groups["Dimensiones"][0].id, "WIDTH");
    }

    #[test]
    fn test_dimension_unit_defaults_to_cm() {
        let view = DimensionsView::from(&PackageDimensions {
            width: Some(1.0),
            ..PackageDimensions::default()
        });
        assert_eq!(view.unit, "cm");
    }

    #[tokio::test]
    async fn test_fixture_specifications() {
        let adapter = SpecificationsAdapter::new(crate::adapters::testing::fixture_resolver());
        let item = ItemId::new("MCO123456789");
        let specs = adapter.get_product_specifications(&item).await.unwrap();
        assert_eq!(specs.general_specs["Dimensiones"].len(), 4);
        assert_eq!(specs.technical_specs.len(), 2);
        assert_eq!(specs.weight.as_deref(), Some("240 g"));

        let description = adapter.get_product_description(&item).await.unwrap();
        assert!(description.html.unwrap().starts_with("iPhone 14 Pro Max"));
    }
}
