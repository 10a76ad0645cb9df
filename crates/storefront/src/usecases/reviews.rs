use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{ItemId, RatingDistribution, ReviewId, SatisfactionLevel, round_to_tenth};

use super::{ConcernContext, UseCaseResult};
use crate::adapters::{ReviewPageView, ReviewView, ReviewVotes, ReviewsAdapter};
use crate::marketplace::{ReviewDraft, ReviewFilters};

const CONCERN: &str = "product reviews";
const TOP_KEYWORDS: usize = 3;
const DETAILED_CONTENT_CHARS: usize = 50;

const PRAISE_KEYWORDS: [&str; 8] = [
    "excelente", "bueno", "recomendado", "calidad", "rápido", "envío", "perfecto", "satisfecho",
];

const CONCERN_KEYWORDS: [&str; 9] = [
    "problema", "malo", "defecto", "tardó", "lento", "roto", "no funciona", "decepcionado",
    "demorado",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReviews {
    #[serde(flatten)]
    pub page: ReviewPageView,
    pub stats: ReviewStatsView,
    pub has_reviews: bool,
    pub categorized: CategorizedReviews,
    pub insights: ReviewInsights,
    pub summary: ReviewsSummary,
}

/// Figures computed over the reviews actually returned, not the listing's
/// overall summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStatsView {
    pub total: u64,
    pub average: f64,
    pub distribution: RatingDistribution,
}

impl ReviewStatsView {
    #[allow(clippy::cast_precision_loss)]
    fn from_reviews(reviews: &[ReviewView]) -> Self {
        if reviews.is_empty() {
            return Self {
                total: 0,
                average: 0.0,
                distribution: RatingDistribution::default(),
            };
        }
        let sum: u64 = reviews.iter().map(|review| u64::from(review.rating)).sum();
        Self {
            total: reviews.len() as u64,
            average: round_to_tenth(sum as f64 / reviews.len() as f64),
            distribution: RatingDistribution::from_ratings(reviews.iter().map(|review| review.rating)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedReviews {
    pub positive: Vec<ReviewView>,
    pub neutral: Vec<ReviewView>,
    pub negative: Vec<ReviewView>,
    pub with_images: Vec<ReviewView>,
    /// Written within the last 30 days.
    pub recent: Vec<ReviewView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInsights {
    pub satisfaction_level: SatisfactionLevel,
    pub recommendation_rate: u8,
    pub common_praise_points: Vec<KeywordCount>,
    pub common_concerns: Vec<KeywordCount>,
    pub review_quality: ReviewQuality,
    pub trends_over_time: Vec<MonthlyTrend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuality {
    pub detailed_reviews_percentage: u8,
    pub reviews_with_images_percentage: u8,
    pub average_content_length: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub average: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsSummary {
    pub overall_rating: f64,
    pub total_reviews: u64,
    pub recommendation_rate: u8,
    pub satisfaction_level: SatisfactionLevel,
    pub rating_distribution: RatingDistribution,
}

fn categorize(reviews: &[ReviewView], now: DateTime<Utc>) -> CategorizedReviews {
    let cutoff = now - Duration::days(30);
    let mut categorized = CategorizedReviews::default();
    for review in reviews {
        match review.rating {
            4..=u8::MAX => categorized.positive.push(review.clone()),
            3 => categorized.neutral.push(review.clone()),
            _ => categorized.negative.push(review.clone()),
        }
        if !review.images.is_empty() {
            categorized.with_images.push(review.clone());
        }
        if review.date_created.is_some_and(|date| date > cutoff) {
            categorized.recent.push(review.clone());
        }
    }
    categorized
}

/// Count the reviews rated within `ratings` whose title or body mention
/// each keyword. Top three by count; ties keep the keyword order.
fn keyword_frequency(
    reviews: &[ReviewView],
    keywords: &[&str],
    ratings: std::ops::RangeInclusive<u8>,
) -> Vec<KeywordCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for review in reviews.iter().filter(|review| ratings.contains(&review.rating)) {
        let text = format!("{} {}", review.title, review.content).to_lowercase();
        for &keyword in keywords {
            if text.contains(keyword) {
                *counts.entry(keyword).or_default() += 1;
            }
        }
    }
    let mut frequency: Vec<KeywordCount> = keywords
        .iter()
        .filter_map(|keyword| {
            counts.get(keyword).map(|&count| KeywordCount {
                keyword: (*keyword).to_owned(),
                count,
            })
        })
        .collect();
    frequency.sort_by(|a, b| b.count.cmp(&a.count));
    frequency.truncate(TOP_KEYWORDS);
    frequency
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * part as f64 / total as f64).round() as u8
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn assess_quality(reviews: &[ReviewView]) -> ReviewQuality {
    if reviews.is_empty() {
        return ReviewQuality::default();
    }
    let lengths: Vec<usize> = reviews
        .iter()
        .map(|review| review.content.chars().count())
        .collect();
    let detailed = lengths
        .iter()
        .filter(|&&len| len > DETAILED_CONTENT_CHARS)
        .count();
    let with_images = reviews
        .iter()
        .filter(|review| !review.images.is_empty())
        .count();
    let total_length: usize = lengths.iter().sum();

    ReviewQuality {
        detailed_reviews_percentage: percentage(detailed, reviews.len()),
        reviews_with_images_percentage: percentage(with_images, reviews.len()),
        average_content_length: (total_length as f64 / reviews.len() as f64).round() as u64,
    }
}

/// Average rating per calendar month, oldest first. Undated reviews are
/// left out.
#[allow(clippy::cast_precision_loss)]
fn monthly_trends(reviews: &[ReviewView]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for review in reviews {
        let Some(date) = review.date_created else {
            continue;
        };
        let (sum, count) = months.entry(date.format("%Y-%m").to_string()).or_default();
        *sum += u64::from(review.rating);
        *count += 1;
    }
    months
        .into_iter()
        .map(|(month, (sum, count))| MonthlyTrend {
            month,
            average: round_to_tenth(sum as f64 / count as f64),
            count,
        })
        .collect()
}

fn insights(reviews: &[ReviewView], stats: &ReviewStatsView) -> ReviewInsights {
    ReviewInsights {
        satisfaction_level: SatisfactionLevel::from_average(stats.average),
        recommendation_rate: stats.distribution.recommendation_rate(),
        common_praise_points: keyword_frequency(reviews, &PRAISE_KEYWORDS, 4..=5),
        common_concerns: keyword_frequency(reviews, &CONCERN_KEYWORDS, 0..=3),
        review_quality: assess_quality(reviews),
        trends_over_time: monthly_trends(reviews),
    }
}

fn summarize(stats: &ReviewStatsView) -> ReviewsSummary {
    ReviewsSummary {
        overall_rating: stats.average,
        total_reviews: stats.total,
        recommendation_rate: stats.distribution.recommendation_rate(),
        satisfaction_level: SatisfactionLevel::from_average(stats.average),
        rating_distribution: stats.distribution,
    }
}

#[derive(Clone)]
pub struct GetProductReviews {
    reviews: ReviewsAdapter,
}

impl GetProductReviews {
    #[must_use]
    pub const fn new(reviews: ReviewsAdapter) -> Self {
        Self { reviews }
    }

    /// One page of reviews with stats, buckets and insights computed over
    /// that page. A rating filter narrows the page to that star value.
    ///
    /// # Errors
    ///
    /// Fails when the reviews cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn execute(&self, item: &ItemId, filters: ReviewFilters) -> UseCaseResult<ProductReviews> {
        let page = if filters.rating.is_some() {
            self.reviews.get_reviews_filtered(item, filters).await
        } else {
            self.reviews
                .get_product_reviews(item, filters.limit, filters.offset)
                .await
        }
        .concerning(CONCERN)?;

        let stats = ReviewStatsView::from_reviews(&page.reviews);
        Ok(ProductReviews {
            has_reviews: !page.reviews.is_empty(),
            categorized: categorize(&page.reviews, Utc::now()),
            insights: insights(&page.reviews, &stats),
            summary: summarize(&stats),
            stats,
            page,
        })
    }

    /// # Errors
    ///
    /// Fails when the draft is rejected or the listing does not exist.
    #[instrument(skip(self, draft), fields(item_id = %item))]
    pub async fn create_review(&self, item: &ItemId, draft: &ReviewDraft) -> UseCaseResult<ReviewView> {
        self.reviews
            .create_review(item, draft)
            .await
            .concerning("review creation")
    }

    /// # Errors
    ///
    /// Fails when the review does not exist.
    pub async fn mark_helpful(&self, id: &ReviewId, user: &str, helpful: bool) -> UseCaseResult<ReviewVotes> {
        self.reviews
            .mark_helpful(id, user, helpful)
            .await
            .concerning("review vote")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::usecases::testing::fixture_use_cases;

    const IPHONE: &str = "MCO123456789";

    async fn iphone_reviews() -> ProductReviews {
        fixture_use_cases()
            .reviews
            .execute(&ItemId::new(IPHONE), ReviewFilters::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stats_come_from_returned_reviews() {
        let result = iphone_reviews().await;
        assert!(result.has_reviews);
        assert_eq!(result.page.rating_summary.total, 47);
        assert_eq!(result.stats.total, 5);
        assert!((result.stats.average - 4.4).abs() < f64::EPSILON);
        assert_eq!(result.stats.distribution.count(5), 3);
        assert_eq!(result.summary.recommendation_rate, 80);
        assert_eq!(result.summary.satisfaction_level, SatisfactionLevel::High);
    }

    #[tokio::test]
    async fn test_categorized_buckets() {
        let categorized = iphone_reviews().await.categorized;
        assert_eq!(categorized.positive.len(), 4);
        assert_eq!(categorized.neutral.len(), 1);
        assert!(categorized.negative.is_empty());
        assert_eq!(categorized.with_images.len(), 2);
    }

    #[tokio::test]
    async fn test_insights() {
        let insights = iphone_reviews().await.insights;
        let praise: Vec<_> = insights
            .common_praise_points
            .iter()
            .map(|k| (k.keyword.as_str(), k.count))
            .collect();
        assert_eq!(praise, vec![("excelente", 2), ("envío", 2), ("perfecto", 2)]);
        assert_eq!(insights.common_concerns.len(), 1);
        assert_eq!(insights.review_quality.detailed_reviews_percentage, 100);
        assert_eq!(insights.review_quality.reviews_with_images_percentage, 40);
        assert_eq!(insights.trends_over_time.len(), 1);
        assert_eq!(insights.trends_over_time[0].month, "2024-01");
        assert_eq!(insights.trends_over_time[0].count, 5);
    }

    #[tokio::test]
    async fn test_rating_filter() {
        let filters = ReviewFilters {
            rating: Some(5),
            ..ReviewFilters::default()
        };
        let result = fixture_use_cases()
            .reviews
            .execute(&ItemId::new(IPHONE), filters)
            .await
            .unwrap();
        assert_eq!(result.stats.total, 3);
        assert_eq!(result.summary.recommendation_rate, 100);
    }

    #[test]
    fn test_empty_page() {
        let stats = ReviewStatsView::from_reviews(&[]);
        assert_eq!(stats.total, 0);
        let insights = insights(&[], &stats);
        assert_eq!(insights.recommendation_rate, 0);
        assert_eq!(insights.review_quality, ReviewQuality::default());
        assert_eq!(insights.satisfaction_level, SatisfactionLevel::VeryLow);
    }

    #[tokio::test]
    async fn test_create_review_rejects_bad_rating() {
        let use_cases = fixture_use_cases();
        let draft = ReviewDraft {
            rating: 0,
            title: "Malo".to_owned(),
            ..ReviewDraft::default()
        };
        let err = use_cases
            .reviews
            .create_review(&ItemId::new(IPHONE), &draft)
            .await
            .unwrap_err();
        assert!(err.is_rejected());

        let after = use_cases
            .reviews
            .execute(&ItemId::new(IPHONE), ReviewFilters::default())
            .await
            .unwrap();
        assert_eq!(after.page.rating_summary.total, 47);
    }
}
