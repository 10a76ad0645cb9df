use std::time::Duration;

use tracing::{debug, warn};

use crate::config::MockConfig;
use crate::services::ServiceError;

/// Latency for methods missing from [`default_delay_ms`].
const FALLBACK_DELAY_MS: u64 = 1000;

/// Typical latency of the real endpoint behind each operation.
fn default_delay_ms(method: &str) -> u64 {
    match method {
        "get_question" | "get_method" | "validate_payment" | "get_review"
        | "get_question_stats" | "get_cart" | "remove_cart_item" | "get_stock_info"
        | "get_buyer_protection" | "get_item_pictures" => 400,
        "vote_review" => 300,
        "get_installments" | "delete_question" | "get_review_stats" | "report_review"
        | "get_category" | "get_category_attributes" | "get_trends" | "get_seller_stats"
        | "update_cart_item" | "add_cart_item" | "get_order" | "get_shipment"
        | "track_shipment" | "get_product_specs" | "get_product_dimensions"
        | "get_product_highlights" => 500,
        "get_item_description" | "is_official_store" | "get_accepted_methods"
        | "get_site_methods" | "get_item_questions" | "get_seller_questions"
        | "get_seller_reviews" | "get_site_categories" | "create_cart" | "apply_coupon"
        | "update_order_status" | "get_shipping_options" | "get_shipping_promise"
        | "get_shipping_modes" => 600,
        "get_user" | "answer_question" | "get_item_reviews" | "predict_category"
        | "get_pickup_points" => 700,
        "get_item" | "get_items" | "get_user_items" | "ask_question" | "cancel_order"
        | "get_zip_code_info" => 800,
        "related_items" => 900,
        "create_review" => 1000,
        "search" | "initiate_checkout" | "create_order" => 1200,
        "add_payment" => 1500,
        _ => FALLBACK_DELAY_MS,
    }
}

/// Network behaviour applied to every fixture call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSimulator {
    delay: Option<Duration>,
    error_rate: f64,
}

impl NetworkSimulator {
    #[must_use]
    pub fn new(delay: Option<Duration>, error_rate: f64) -> Self {
        Self {
            delay,
            error_rate: error_rate.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn from_config(config: &MockConfig) -> Self {
        Self::new(config.delay, config.error_rate)
    }

    /// No latency and no failures.
    #[must_use]
    pub fn instant() -> Self {
        Self::new(Some(Duration::ZERO), 0.0)
    }

    /// Configured delay, or the method's default when none is set.
    #[must_use]
    pub fn delay_for(&self, method: &str) -> Duration {
        match self.delay {
            Some(delay) => delay,
            None => Duration::from_millis(default_delay_ms(method)),
        }
    }

    /// Run before touching fixture data: log, wait, maybe fail.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Simulated`] with probability `error_rate`.
    pub async fn call(&self, service: &'static str, method: &'static str) -> Result<(), ServiceError> {
        debug!(service, method, "fixture call");

        let delay = self.delay_for(method);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.error_rate > 0.0 && rand::random::<f64>() < self.error_rate {
            warn!(service, method, "Simulated network error");
            return Err(ServiceError::Simulated);
        }
        Ok(())
    }
}

impl Default for NetworkSimulator {
    fn default() -> Self {
        Self::new(None, 0.05)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_per_method_defaults() {
        let simulator = NetworkSimulator::new(None, 0.0);
        assert_eq!(simulator.delay_for("get_item"), Duration::from_millis(800));
        assert_eq!(simulator.delay_for("add_payment"), Duration::from_millis(1500));
        assert_eq!(simulator.delay_for("unknown"), Duration::from_millis(1000));
    }

    #[test]
    fn test_configured_delay_overrides_defaults() {
        let simulator = NetworkSimulator::new(Some(Duration::from_millis(5)), 0.0);
        assert_eq!(simulator.delay_for("search"), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_error_rate_bounds() {
        assert!(NetworkSimulator::instant().call("product", "get_item").await.is_ok());

        let failing = NetworkSimulator::new(Some(Duration::ZERO), 1.0);
        let err = failing.call("product", "get_item").await.unwrap_err();
        assert!(matches!(err, ServiceError::Simulated));

        // Out-of-range rates are clamped.
        assert!(NetworkSimulator::new(Some(Duration::ZERO), -3.0).call("product", "get_item").await.is_ok());
    }
}
