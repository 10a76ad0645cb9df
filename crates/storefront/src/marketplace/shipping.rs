use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrina_core::{CurrencyCode, ItemId, ShipmentId, ShippingServiceId, SiteId};

use super::FreeShipping;

/// A way to ship a listing to a destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingOption {
    pub id: ShippingServiceId,
    pub name: String,
    pub display_name: Option<String>,
    pub currency_id: Option<CurrencyCode>,
    pub list_cost: Decimal,
    pub cost: Decimal,
    pub free_shipping: FreeShipping,
    #[serde(alias = "estimated_delivery_time")]
    pub estimated_delivery: Option<EstimatedDelivery>,
    pub speed_ranking: Option<u32>,
    pub delivery_type: Option<String>,
    pub shipping_method_type: Option<String>,
    pub shipping_option_type: Option<String>,
    pub receivers: Vec<Receiver>,
    pub tags: Vec<String>,
}

impl ShippingOption {
    /// Pickup points offered by this option.
    pub fn pickup_points(&self) -> impl Iterator<Item = &PickupPoint> {
        self.receivers
            .iter()
            .filter(|receiver| receiver.kind == "pickup_point")
            .flat_map(|receiver| receiver.details.pickup_points.iter())
    }

    /// Date the shipment is expected at the destination.
    #[must_use]
    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.estimated_delivery.as_ref().and_then(|e| e.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatedDelivery {
    pub date: Option<DateTime<Utc>>,
    pub unit: Option<String>,
    pub offset: Option<DeliveryOffset>,
}

/// Business days until dispatch (`shipping`) and until delivery (`date`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryOffset {
    pub date: u32,
    pub shipping: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receiver {
    #[serde(rename = "type")]
    pub kind: String,
    pub details: ReceiverDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverDetails {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pickup_points: Vec<PickupPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupPoint {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub business_hours: Vec<BusinessHours>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHours {
    pub day: String,
    pub time: String,
}

/// `/items/{id}/shipping_options` response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingOptionsResponse {
    pub options: Vec<ShippingOption>,
}

/// Location resolved from a postal code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipCodeInfo {
    pub zip_code: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_id: Option<String>,
}

/// Delivery promise for a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingPromise {
    pub item_id: ItemId,
    pub zip_code: Option<String>,
    pub shipping_option_id: Option<ShippingServiceId>,
    pub free_shipping: bool,
    pub estimated_delivery: Option<EstimatedDelivery>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupPoints {
    pub zip_code: String,
    pub site_id: Option<SiteId>,
    pub pickup_points: Vec<PickupPoint>,
}

/// Shipping configuration read off a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingModes {
    pub free_shipping: bool,
    pub mode: String,
    pub local_pick_up: bool,
    pub tags: Vec<String>,
    pub logistic_type: Option<String>,
}

impl From<Option<&super::ItemShipping>> for ShippingModes {
    fn from(shipping: Option<&super::ItemShipping>) -> Self {
        Self {
            free_shipping: shipping.is_some_and(|s| s.free_shipping),
            mode: shipping
                .and_then(|s| s.mode.clone())
                .unwrap_or_else(|| "not_specified".to_owned()),
            local_pick_up: shipping.is_some_and(|s| s.local_pick_up),
            tags: shipping.map(|s| s.tags.clone()).unwrap_or_default(),
            logistic_type: shipping.and_then(|s| s.logistic_type.clone()),
        }
    }
}

/// Shipment status with its history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentTracking {
    pub id: ShipmentId,
    pub status: String,
    pub status_history: Vec<ShipmentEvent>,
    pub estimated_delivery: Option<EstimatedDelivery>,
    pub tracking_number: Option<String>,
    pub carrier: Option<Carrier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentEvent {
    pub status: String,
    pub date_created: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Carrier {
    pub name: String,
    pub phone: Option<String>,
}
