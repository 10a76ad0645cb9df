use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrina_core::{CurrencyCode, ItemCondition, ItemId, SellerId, SiteId};

use super::Paging;

/// A marketplace user (`/users/{id}`). Sellers are users with a reputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: SellerId,
    pub nickname: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub registration_date: Option<DateTime<Utc>>,
    pub country_id: Option<String>,
    pub site_id: Option<SiteId>,
    pub address: Option<UserAddress>,
    pub user_type: Option<String>,
    pub tags: Vec<String>,
    pub logo: Option<String>,
    pub points: Option<i64>,
    pub permalink: Option<String>,
    pub seller_experience: Option<String>,
    pub seller_reputation: Option<SellerReputation>,
    pub status: Option<UserStatus>,
    pub eshop: Option<Eshop>,
}

impl User {
    /// Sellers tagged `eshop` run an official store.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SellerReputation {
    pub level_id: Option<String>,
    pub power_seller_status: Option<String>,
    pub transactions: Transactions,
    pub metrics: Option<ReputationMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transactions {
    pub canceled: u64,
    pub completed: u64,
    pub period: Option<String>,
    pub ratings: TransactionRatings,
    pub total: u64,
}

/// Rating breakdown. Counts in fixture data; the live API may report ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionRatings {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationMetrics {
    pub sales: SalesMetric,
    pub claims: RateMetric,
    pub delayed_handling_time: RateMetric,
    pub cancellations: RateMetric,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesMetric {
    pub period: Option<String>,
    pub completed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateMetric {
    pub period: Option<String>,
    pub rate: f64,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStatus {
    pub site_status: Option<String>,
    pub list: Option<StatusPermission>,
    pub confirmed_email: Option<bool>,
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPermission {
    pub allow: bool,
    pub codes: Vec<String>,
}

/// Official store branding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Eshop {
    pub eshop_id: Option<u64>,
    pub nick_name: Option<String>,
    pub eshop_logo_url: Option<String>,
    pub site_id: Option<SiteId>,
}

/// Listing summary as returned by the seller items search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SellerItem {
    pub id: ItemId,
    pub title: String,
    pub price: Decimal,
    pub currency_id: Option<CurrencyCode>,
    pub available_quantity: u32,
    pub sold_quantity: u32,
    pub condition: ItemCondition,
    pub thumbnail: Option<String>,
    pub permalink: Option<String>,
}

/// `/sites/{site}/search?seller_id=` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserItems {
    pub seller_id: SellerId,
    pub query: Option<String>,
    pub paging: Paging,
    pub results: Vec<SellerItem>,
}

/// Reputation figures extracted from a user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerStats {
    pub total_sales: u64,
    pub positive_rating: f64,
    pub neutral_rating: f64,
    pub negative_rating: f64,
    pub power_seller_status: Option<String>,
    pub level_id: Option<String>,
    pub registration_date: Option<DateTime<Utc>>,
}

impl From<&User> for SellerStats {
    fn from(user: &User) -> Self {
        let reputation = user.seller_reputation.clone().unwrap_or_default();
        let ratings = reputation.transactions.ratings;
        Self {
            total_sales: reputation.transactions.total,
            positive_rating: ratings.positive,
            neutral_rating: ratings.neutral,
            negative_rating: ratings.negative,
            power_seller_status: reputation.power_seller_status,
            level_id: reputation.level_id,
            registration_date: user.registration_date,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_without_reputation_are_zero() {
        let user: User = serde_json::from_str(r#"{"id": 1, "nickname": "NEW"}"#).unwrap();
        let stats = SellerStats::from(&user);
        assert_eq!(stats.total_sales, 0);
        assert!(stats.level_id.is_none());
    }

    #[test]
    fn test_stats_read_transactions() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 123456,
            "nickname": "TECHSTORE_OFICIAL",
            "tags": ["eshop"],
            "seller_reputation": {
                "level_id": "premium",
                "transactions": {"total": 2847, "ratings": {"positive": 2735, "neutral": 89, "negative": 23}}
            }
        }))
        .unwrap();
        let stats = SellerStats::from(&user);
        assert_eq!(stats.total_sales, 2847);
        assert!((stats.positive_rating - 2735.0).abs() < f64::EPSILON);
        assert!(user.has_tag("eshop"));
    }
}
