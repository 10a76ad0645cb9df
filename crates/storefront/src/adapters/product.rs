use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{CategoryId, CurrencyCode, ItemCondition, ItemId, PictureId, SellerId, VariationId};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{Attribute, Item, Variation};
use crate::services::ServiceResolver;

/// Basic listing information for the product header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ItemId,
    pub title: String,
    pub subtitle: String,
    pub condition: ItemCondition,
    pub price: PriceView,
    pub available_quantity: u32,
    pub sold_quantity: u32,
    pub rating: RatingView,
    pub attributes: Vec<AttributeView>,
    pub variations: Vec<VariationView>,
    /// Picture URLs in listing order.
    pub pictures: Vec<String>,
    pub seller: SellerRef,
    pub category_id: CategoryId,
    pub shipping: ProductShippingView,
    pub warranty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub installments: Option<InstallmentsView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentsView {
    pub quantity: u32,
    pub amount: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    pub average: f64,
    pub total_reviews: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeView {
    pub id: String,
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationView {
    pub id: VariationId,
    pub attribute_combinations: Vec<AttributeView>,
    pub price: Decimal,
    pub available_quantity: u32,
    pub picture: Option<PictureId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SellerRef {
    pub id: SellerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductShippingView {
    pub free_shipping: bool,
    pub mode: Option<String>,
    pub local_pick_up: bool,
    pub logistic_type: Option<String>,
}

/// Attribute value for display: the value name, else the numeric value,
/// else the unit.
fn attribute_value(attr: &Attribute) -> Option<String> {
    attr.value_name.clone().or_else(|| {
        let value_struct = attr.value_struct.as_ref()?;
        value_struct
            .number
            .map(|number| number.to_string())
            .or_else(|| value_struct.unit.clone())
    })
}

impl From<&Variation> for VariationView {
    fn from(variation: &Variation) -> Self {
        Self {
            id: variation.id.clone(),
            attribute_combinations: variation
                .attribute_combinations
                .iter()
                .map(|combo| AttributeView {
                    id: combo.id.clone(),
                    name: combo.name.clone(),
                    value: combo.value_name.clone(),
                })
                .collect(),
            price: variation.price,
            available_quantity: variation.available_quantity,
            picture: variation.picture_ids.first().cloned(),
        }
    }
}

impl From<&Item> for ProductView {
    fn from(item: &Item) -> Self {
        let subtitle = item.subtitle.clone().unwrap_or_else(|| {
            format!("{} | +{} vendidos", item.condition.label(), item.sold_quantity)
        });
        let rating = item.reviews.unwrap_or_default();
        let shipping = item.shipping.clone().unwrap_or_default();

        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            subtitle,
            condition: item.condition,
            price: PriceView {
                amount: item.price,
                currency: CurrencyCode::parse_or_default(item.currency_id.as_deref()),
                installments: item.installments.as_ref().map(|plan| InstallmentsView {
                    quantity: plan.quantity,
                    amount: plan.amount,
                    rate: plan.rate,
                }),
            },
            available_quantity: item.available_quantity,
            sold_quantity: item.sold_quantity,
            rating: RatingView {
                average: rating.rating_average,
                total_reviews: rating.total,
            },
            attributes: item
                .attributes
                .iter()
                .map(|attr| AttributeView {
                    id: attr.id.clone(),
                    name: attr.name.clone(),
                    value: attribute_value(attr),
                })
                .collect(),
            variations: item.variations.iter().map(VariationView::from).collect(),
            pictures: item
                .pictures
                .iter()
                .filter_map(|picture| picture.best_url().map(str::to_owned))
                .collect(),
            seller: SellerRef { id: item.seller_id },
            category_id: item.category_id.clone(),
            shipping: ProductShippingView {
                free_shipping: shipping.free_shipping,
                mode: shipping.mode,
                local_pick_up: shipping.local_pick_up,
                logistic_type: shipping.logistic_type,
            },
            warranty: item.warranty.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ProductAdapter {
    services: ServiceResolver,
}

impl ProductAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing cannot be fetched.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn get_product_info(&self, id: &ItemId) -> AdapterResult<ProductView> {
        let item = self
            .services
            .call(|services| services.product.get_item(id))
            .await
            .fetching("product info")?;
        Ok(ProductView::from(&item))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing cannot be fetched.
    pub async fn get_product_variations(&self, id: &ItemId) -> AdapterResult<Vec<VariationView>> {
        let item = self
            .services
            .call(|services| services.product.get_item(id))
            .await
            .fetching("product variations")?;
        Ok(item.variations.iter().map(VariationView::from).collect())
    }

    /// Listings from the same category, excluding `id` itself.
    ///
    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listing or the category search
    /// fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn get_related_products(&self, id: &ItemId, limit: u32) -> AdapterResult<Vec<ProductView>> {
        let items = self
            .services
            .call(|services| services.product.related_items(id, limit))
            .await
            .fetching("related products")?;
        Ok(items.iter().map(ProductView::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::testing::fixture_resolver;

    #[test]
    fn test_defaults_for_sparse_listing() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "MCO1",
            "title": "Cable",
            "price": 10000,
            "condition": "used",
            "sold_quantity": 7,
            "attributes": [
                {"id": "LENGTH", "name": "Largo", "value_struct": {"number": 1.5, "unit": "m"}},
                {"id": "UNIT", "name": "Unidad", "value_struct": {"unit": "m"}}
            ]
        }))
        .unwrap();
        let view = ProductView::from(&item);
        assert_eq!(view.subtitle, "Usado | +7 vendidos");
        assert_eq!(view.price.currency, CurrencyCode::Cop);
        assert!(view.price.installments.is_none());
        assert!(view.rating.average.abs() < f64::EPSILON);
        assert_eq!(view.attributes[0].value.as_deref(), Some("1.5"));
        assert_eq!(view.attributes[1].value.as_deref(), Some("m"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let item = Item {
            id: ItemId::new("MCO1"),
            available_quantity: 3,
            ..Item::default()
        };
        let json = serde_json::to_value(ProductView::from(&item)).unwrap();
        assert_eq!(json["availableQuantity"], 3);
        assert!(json.get("categoryId").is_some());
        assert!(json["price"].get("currency").is_some());
    }

    #[tokio::test]
    async fn test_fixture_product_info() {
        let adapter = ProductAdapter::new(fixture_resolver());
        let view = adapter.get_product_info(&ItemId::new("MCO123456789")).await.unwrap();
        assert_eq!(view.id.as_str(), "MCO123456789");
        assert_eq!(view.seller.id, SellerId::new(123_456));
        assert_eq!(view.price.currency, CurrencyCode::Cop);

        let err = adapter.get_product_info(&ItemId::new("MCO0")).await.unwrap_err();
        assert!(err.to_string().starts_with("Error fetching product info: "));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_related_products_exclude_the_listing() {
        let adapter = ProductAdapter::new(fixture_resolver());
        let related = adapter
            .get_related_products(&ItemId::new("MCO123456789"), 5)
            .await
            .unwrap();
        assert!(related.iter().all(|view| view.id.as_str() != "MCO123456789"));
        assert!(related.iter().all(|view| view.category_id.as_str() == "MCO1055"));

        let err = adapter
            .get_related_products(&ItemId::new("MCO0"), 5)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Error fetching related products: "));
    }
}
