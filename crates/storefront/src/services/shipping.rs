use async_trait::async_trait;
use vitrina_core::{ItemId, ShipmentId, ShippingServiceId};

use super::ServiceResult;
use crate::marketplace::{
    PickupPoints, ShipmentTracking, ShippingModes, ShippingOption, ShippingPromise, ZipCodeInfo,
};

#[async_trait]
pub trait ShippingService: Send + Sync {
    async fn get_shipping_options(
        &self,
        item: &ItemId,
        zip_code: &str,
        quantity: u32,
    ) -> ServiceResult<Vec<ShippingOption>>;

    async fn get_zip_code_info(&self, country: &str, zip_code: &str) -> ServiceResult<ZipCodeInfo>;

    async fn get_shipping_promise(&self, item: &ItemId, zip_code: Option<&str>) -> ServiceResult<ShippingPromise>;

    async fn get_pickup_points(
        &self,
        service: &ShippingServiceId,
        zip_code: &str,
    ) -> ServiceResult<PickupPoints>;

    /// Shipping configuration of a listing; mode `not_specified` when absent.
    async fn get_shipping_modes(&self, item: &ItemId) -> ServiceResult<ShippingModes>;

    async fn track_shipment(&self, id: &ShipmentId) -> ServiceResult<ShipmentTracking>;
}
