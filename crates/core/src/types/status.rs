//! Status enums and derived quality levels.
//!
//! The marketplace reports statuses as strings; these enums give them names
//! and hold the bucketing rules used to summarize sellers, questions and
//! reviews.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Question moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStatus {
    #[default]
    Unanswered,
    Answered,
    Closed,
    UnderReview,
    Banned,
    Deleted,
}

impl QuestionStatus {
    /// Status as it appears in API query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unanswered => "UNANSWERED",
            Self::Answered => "ANSWERED",
            Self::Closed => "CLOSED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Banned => "BANNED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment bucket assigned to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewValorization {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl ReviewValorization {
    /// Four stars and up are positive, three is neutral.
    #[must_use]
    pub const fn from_rating(rating: u8) -> Self {
        match rating {
            4..=u8::MAX => Self::Positive,
            3 => Self::Neutral,
            _ => Self::Negative,
        }
    }
}

/// Listing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    Used,
    Refurbished,
    #[default]
    #[serde(other)]
    NotSpecified,
}

impl ItemCondition {
    /// Buyer-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Nuevo",
            Self::Used => "Usado",
            Self::Refurbished => "Reacondicionado",
            Self::NotSpecified => "No especificado",
        }
    }
}

/// Stock availability bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    MediumStock,
    InStock,
}

impl StockStatus {
    /// Bucket an available quantity.
    #[must_use]
    pub const fn from_quantity(available: u32) -> Self {
        match available {
            0 => Self::OutOfStock,
            1..=5 => Self::LowStock,
            6..=20 => Self::MediumStock,
            _ => Self::InStock,
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Confirmed,
    PaymentRequired,
    PaymentInProcess,
    Paid,
    Cancelled,
    #[serde(other)]
    Invalid,
}

impl OrderStatus {
    /// Paid and cancelled orders are closed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

/// How far buyers can trust a seller, from transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Unknown,
    New,
    Excellent,
    VeryGood,
    Good,
    Average,
    Poor,
}

impl TrustLevel {
    /// Sellers with fewer transactions than this are rated `New`.
    pub const MIN_TRANSACTIONS: u64 = 10;

    /// Bucket a seller by positive ratings over total transactions.
    ///
    /// `positive` is a count; the marketplace reports it as a JSON number that
    /// is not always integral.
    #[must_use]
    pub fn from_transactions(total: u64, positive: f64) -> Self {
        if total < Self::MIN_TRANSACTIONS {
            return Self::New;
        }
        #[allow(clippy::cast_precision_loss)] // transaction counts stay far below 2^52
        let ratio = positive / total as f64;
        if ratio >= 0.98 {
            Self::Excellent
        } else if ratio >= 0.95 {
            Self::VeryGood
        } else if ratio >= 0.90 {
            Self::Good
        } else if ratio >= 0.80 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

/// Generic five-step quality scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Excellent,
    VeryGood,
    Good,
    Average,
    Poor,
}

impl QualityLevel {
    /// Bucket a 0-100 score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            Self::Excellent
        } else if score >= 85.0 {
            Self::VeryGood
        } else if score >= 75.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

/// Overall buyer satisfaction from the average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionLevel {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
}

impl SatisfactionLevel {
    #[must_use]
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            Self::VeryHigh
        } else if average >= 4.0 {
            Self::High
        } else if average >= 3.5 {
            Self::Moderate
        } else if average >= 3.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

/// How quickly and how often a seller answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Responsiveness {
    NoData,
    Excellent,
    VeryGood,
    Good,
    Average,
    Poor,
}

impl Responsiveness {
    /// Bucket by response rate (percent) and average response time (hours).
    #[must_use]
    pub fn from_metrics(total_questions: u64, response_rate: f64, avg_hours: f64) -> Self {
        if total_questions == 0 {
            Self::NoData
        } else if response_rate >= 95.0 && avg_hours <= 2.0 {
            Self::Excellent
        } else if response_rate >= 85.0 && avg_hours <= 6.0 {
            Self::VeryGood
        } else if response_rate >= 70.0 && avg_hours <= 24.0 {
            Self::Good
        } else if response_rate >= 50.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_level_buckets() {
        assert_eq!(TrustLevel::from_transactions(5, 5.0), TrustLevel::New);
        assert_eq!(TrustLevel::from_transactions(100, 98.0), TrustLevel::Excellent);
        assert_eq!(TrustLevel::from_transactions(2847, 2735.0), TrustLevel::VeryGood);
        assert_eq!(TrustLevel::from_transactions(456, 425.0), TrustLevel::Good);
        assert_eq!(TrustLevel::from_transactions(100, 85.0), TrustLevel::Average);
        assert_eq!(TrustLevel::from_transactions(100, 50.0), TrustLevel::Poor);
    }

    #[test]
    fn test_stock_status_boundaries() {
        assert_eq!(StockStatus::from_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_quantity(5), StockStatus::LowStock);
        assert_eq!(StockStatus::from_quantity(6), StockStatus::MediumStock);
        assert_eq!(StockStatus::from_quantity(20), StockStatus::MediumStock);
        assert_eq!(StockStatus::from_quantity(45), StockStatus::InStock);
    }

    #[test]
    fn test_valorization_from_rating() {
        assert_eq!(ReviewValorization::from_rating(5), ReviewValorization::Positive);
        assert_eq!(ReviewValorization::from_rating(3), ReviewValorization::Neutral);
        assert_eq!(ReviewValorization::from_rating(1), ReviewValorization::Negative);
    }

    #[test]
    fn test_responsiveness_requires_speed_and_rate() {
        assert_eq!(Responsiveness::from_metrics(0, 0.0, 0.0), Responsiveness::NoData);
        assert_eq!(Responsiveness::from_metrics(5, 100.0, 1.0), Responsiveness::Excellent);
        assert_eq!(Responsiveness::from_metrics(5, 100.0, 4.0), Responsiveness::VeryGood);
        assert_eq!(Responsiveness::from_metrics(5, 80.0, 3.0), Responsiveness::Good);
        assert_eq!(Responsiveness::from_metrics(5, 80.0, 48.0), Responsiveness::Average);
        assert_eq!(Responsiveness::from_metrics(5, 20.0, 1.0), Responsiveness::Poor);
    }

    #[test]
    fn test_unknown_condition_is_not_specified() {
        let condition: ItemCondition = serde_json::from_str("\"like_new\"").unwrap_or_default();
        assert_eq!(condition, ItemCondition::NotSpecified);
        assert_eq!(ItemCondition::New.label(), "Nuevo");
    }

    #[test]
    fn test_quality_level_buckets() {
        assert_eq!(QualityLevel::from_score(98.5), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(85.0), QualityLevel::VeryGood);
        assert_eq!(QualityLevel::from_score(10.0), QualityLevel::Poor);
    }
}
