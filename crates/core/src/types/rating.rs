//! Star-rating distributions and the summary figures derived from them.

use serde::{Deserialize, Serialize};

/// Count of reviews per star value.
///
/// Serialized with the star value as key (`{"5": 34, "4": 8, ...}`), which is
/// the shape the marketplace uses for `rating_distribution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatingDistribution {
    #[serde(rename = "5", default)]
    pub five: u64,
    #[serde(rename = "4", default)]
    pub four: u64,
    #[serde(rename = "3", default)]
    pub three: u64,
    #[serde(rename = "2", default)]
    pub two: u64,
    #[serde(rename = "1", default)]
    pub one: u64,
}

impl RatingDistribution {
    /// Build a distribution from individual ratings; values outside 1..=5 are ignored.
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let mut distribution = Self::default();
        for rating in ratings {
            distribution.record(rating);
        }
        distribution
    }

    /// Count one more review with the given rating. Returns `false` if out of range.
    pub const fn record(&mut self, rating: u8) -> bool {
        match rating {
            5 => self.five += 1,
            4 => self.four += 1,
            3 => self.three += 1,
            2 => self.two += 1,
            1 => self.one += 1,
            _ => return false,
        }
        true
    }

    /// Count for a star value (0 outside 1..=5).
    #[must_use]
    pub const fn count(&self, rating: u8) -> u64 {
        match rating {
            5 => self.five,
            4 => self.four,
            3 => self.three,
            2 => self.two,
            1 => self.one,
            _ => 0,
        }
    }

    /// Total number of counted reviews.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.five + self.four + self.three + self.two + self.one
    }

    /// Mean rating rounded to one decimal; 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
    pub fn average(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let sum = 5 * self.five + 4 * self.four + 3 * self.three + 2 * self.two + self.one;
        round_to_tenth(sum as f64 / total as f64)
    }

    /// Whole-number percentage of four and five star reviews; 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn recommendation_rate(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let recommended = (self.four + self.five) as f64;
        (100.0 * recommended / total as f64).round() as u8
    }
}

/// Round half away from zero to one decimal place.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_from_ratings() {
        let distribution = RatingDistribution::from_ratings([5, 5, 4, 5, 3]);
        assert_eq!(distribution.five, 3);
        assert_eq!(distribution.four, 1);
        assert_eq!(distribution.three, 1);
        assert_eq!(distribution.total(), 5);
        assert!((distribution.average() - 4.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recommendation_rate_rounds() {
        for ratings in [vec![5, 4, 3], vec![5, 5, 4, 5, 3], vec![1, 2, 3], vec![4]] {
            let distribution = RatingDistribution::from_ratings(ratings.iter().copied());
            let recommended = ratings.iter().filter(|&&r| r >= 4).count();
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let expected = (100.0 * recommended as f64 / ratings.len() as f64).round() as u8;
            assert_eq!(distribution.recommendation_rate(), expected);
        }
        assert_eq!(RatingDistribution::default().recommendation_rate(), 0);
        assert_eq!(RatingDistribution::from_ratings([5, 4, 3]).recommendation_rate(), 67);
    }

    #[test]
    fn test_out_of_range_ratings_ignored() {
        let mut distribution = RatingDistribution::default();
        assert!(!distribution.record(6));
        assert!(!distribution.record(0));
        assert_eq!(distribution.total(), 0);
        assert!(distribution.average().abs() < f64::EPSILON);
    }

    #[test]
    fn test_distribution_uses_star_keys() {
        let distribution: RatingDistribution =
            serde_json::from_str(r#"{"5": 34, "4": 8, "3": 3, "2": 1, "1": 1}"#).unwrap();
        assert_eq!(distribution.total(), 47);
        assert_eq!(distribution.count(5), 34);
    }
}
