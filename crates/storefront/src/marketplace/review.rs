use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vitrina_core::{
    ItemId, RatingDistribution, ReviewId, ReviewValorization, SellerId, round_to_tenth,
};

use super::flexible_id;

/// A buyer review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: ReviewId,
    #[serde(alias = "rate")]
    pub rating: u8,
    pub title: String,
    pub content: String,
    pub date_created: Option<DateTime<Utc>>,
    pub reviewer: Reviewer,
    pub likes: u32,
    pub dislikes: u32,
    pub helpful_count: u32,
    pub not_helpful_count: u32,
    pub relevance: Option<f64>,
    pub images: Vec<ReviewImage>,
    pub valorization: ReviewValorization,
    pub status: Option<String>,
    pub buying_date: Option<DateTime<Utc>>,
}

impl Review {
    /// Created within `days` of `now`.
    #[must_use]
    pub fn is_recent(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.date_created
            .is_some_and(|created| now - created <= Duration::days(days))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reviewer {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    pub nickname: String,
    pub level_id: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewImage {
    pub id: Option<String>,
    pub url: String,
    pub size: Option<String>,
}

/// Reviews for a listing with the summary figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemReviews {
    pub item_id: ItemId,
    pub rating_average: f64,
    pub total_reviews: u64,
    pub reviews: Vec<Review>,
    pub rating_distribution: RatingDistribution,
    pub attributes_rating: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_filtered: Option<u64>,
    pub offset: u32,
    pub limit: u32,
}

impl ItemReviews {
    /// Placeholder for a listing nobody reviewed yet.
    #[must_use]
    pub fn empty(item_id: ItemId) -> Self {
        Self {
            item_id,
            ..Self::default()
        }
    }

    /// Recompute the average from the stored reviews.
    pub fn recompute_average(&mut self) {
        self.rating_average = average_rating(&self.reviews);
    }
}

/// Mean rating rounded to a tenth; 0 for no reviews.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
    round_to_tenth(sum as f64 / reviews.len() as f64)
}

/// Optional star filter plus pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewFilters {
    pub rating: Option<u8>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ReviewFilters {
    fn default() -> Self {
        Self {
            rating: None,
            limit: 10,
            offset: 0,
        }
    }
}

/// A review as submitted by a buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewDraft {
    pub rating: u8,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub user_nickname: Option<String>,
    pub images: Vec<ReviewImage>,
}

impl ReviewDraft {
    /// Reject out-of-range ratings and blank titles.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.rating) {
            return Err("Rating must be between 1 and 5".to_owned());
        }
        if self.title.trim().is_empty() {
            return Err("Title is required".to_owned());
        }
        Ok(())
    }
}

/// Average score for one reviewed aspect (quality, price, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewAttribute {
    pub id: String,
    pub name: String,
    pub average: f64,
}

impl ReviewAttribute {
    #[must_use]
    pub fn from_ratings(ratings: &BTreeMap<String, f64>) -> Vec<Self> {
        ratings
            .iter()
            .map(|(id, average)| Self {
                id: id.clone(),
                name: attribute_label(id).to_owned(),
                average: *average,
            })
            .collect()
    }
}

fn attribute_label(id: &str) -> &str {
    match id {
        "quality" => "Calidad",
        "price" => "Precio",
        "shipping" => "Envío",
        "service" => "Atención",
        other => other,
    }
}

/// Acknowledgement for a review report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewReport {
    pub id: String,
    pub review_id: ReviewId,
    pub reason: String,
    pub status: String,
    pub date_created: Option<DateTime<Utc>>,
}

/// Review summary figures for a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
    pub attributes_rating: BTreeMap<String, f64>,
    pub recent_reviews_count: u64,
}

impl ReviewStats {
    /// Figures computed from a set of reviews.
    #[must_use]
    pub fn from_reviews(reviews: &[Review], now: DateTime<Utc>) -> Self {
        Self {
            total_reviews: reviews.len() as u64,
            average_rating: average_rating(reviews),
            rating_distribution: RatingDistribution::from_ratings(reviews.iter().map(|r| r.rating)),
            attributes_rating: BTreeMap::new(),
            recent_reviews_count: reviews.iter().filter(|r| r.is_recent(now, 30)).count() as u64,
        }
    }
}

/// Reviews a seller received across listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SellerReviews {
    pub seller_id: SellerId,
    pub rating_average: f64,
    pub total_reviews: u64,
    pub reviews: Vec<Review>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(rating: u8, created: &str) -> Review {
        serde_json::from_value(serde_json::json!({
            "id": 42,
            "rate": rating,
            "title": "t",
            "date_created": created,
            "reviewer": {"id": 7, "nickname": "n"},
        }))
        .unwrap()
    }

    #[test]
    fn test_live_field_names_accepted() {
        let r = review(4, "2024-01-20T10:30:00Z");
        assert_eq!(r.id.as_str(), "42");
        assert_eq!(r.rating, 4);
        assert_eq!(r.reviewer.id, "7");
    }

    #[test]
    fn test_draft_validation_messages() {
        let mut draft = ReviewDraft {
            rating: 6,
            title: "Bueno".to_owned(),
            ..ReviewDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err(), "Rating must be between 1 and 5");
        draft.rating = 5;
        draft.title = "   ".to_owned();
        assert_eq!(draft.validate().unwrap_err(), "Title is required");
        draft.title = "Bueno".to_owned();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_stats_from_reviews() {
        let now: DateTime<Utc> = "2024-01-25T00:00:00Z".parse().unwrap();
        let reviews = [
            review(5, "2024-01-20T10:30:00Z"),
            review(4, "2024-01-18T10:30:00Z"),
            review(3, "2023-10-01T10:30:00Z"),
        ];
        let stats = ReviewStats::from_reviews(&reviews, now);
        assert_eq!(stats.total_reviews, 3);
        assert!((stats.average_rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(stats.rating_distribution.count(3), 1);
        assert_eq!(stats.recent_reviews_count, 2);
    }
}
