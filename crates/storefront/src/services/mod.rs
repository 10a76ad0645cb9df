//! Domain services.
//!
//! Each capability is a `Send + Sync` trait with two implementations: the
//! [`LiveBackend`] talks to the marketplace REST API, the fixture backend in
//! [`crate::fixtures`] serves an in-memory [`crate::fixtures::FixtureStore`].
//! [`ServiceResolver`] picks one per call based on the current [`DataSource`].
//!
//! Both backends return the same raw records wrapped in [`Payload`], and the
//! same [`ServiceError`] variants, so adapters never know which one answered.

mod category;
mod image;
mod live;
mod payment;
mod product;
mod purchase;
mod questions;
mod resolver;
mod reviews;
mod seller;
mod shipping;
mod specifications;

pub use category::CategoryService;
pub use image::{ImageService, ImageSize, optimize_image_url};
pub use live::LiveBackend;
pub use payment::PaymentService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use questions::QuestionsService;
pub use resolver::{DataSource, ServiceResolver, ServiceSet};
pub use reviews::ReviewsService;
pub use seller::SellerService;
pub use shipping::ShippingService;
pub use specifications::SpecificationsService;

use serde::Serialize;
use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced by every service backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("{0}")]
    Validation(String),

    /// Injected by the fixture backend's network simulation.
    #[error("Simulated network error")]
    Simulated,
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Successful service response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Payload<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

pub type ServiceResult<T> = Result<Payload<T>, ServiceError>;

/// Turn a 404 from the API into [`ServiceError::NotFound`].
pub(crate) trait NotFoundExt<T> {
    fn or_not_found(self, entity: &'static str, id: impl ToString) -> Result<T, ServiceError>;
}

impl<T> NotFoundExt<T> for Result<T, ApiError> {
    fn or_not_found(self, entity: &'static str, id: impl ToString) -> Result<T, ServiceError> {
        self.map_err(|err| {
            if err.is_not_found() {
                ServiceError::not_found(entity, id)
            } else {
                ServiceError::Transport(err)
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ServiceError::not_found("Product", "MCO1");
        assert_eq!(err.to_string(), "Product with id MCO1 not found");
    }

    #[test]
    fn test_api_404_maps_to_not_found() {
        let result: Result<(), ApiError> = Err(ApiError::Status {
            status: 404,
            reason: "Not Found".to_owned(),
        });
        let err = result.or_not_found("Seller", 42).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Seller", .. }));

        let result: Result<(), ApiError> = Err(ApiError::Timeout);
        let err = result.or_not_found("Seller", 42).unwrap_err();
        assert_eq!(err.to_string(), "Request timeout");
    }
}
