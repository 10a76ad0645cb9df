use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{ItemId, RatingDistribution, ReviewId, ReviewValorization};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{ItemReviews, Paging, Review, ReviewDraft, ReviewFilters};
use crate::services::{ImageSize, ServiceResolver, optimize_image_url};

/// One page of reviews with the listing's rating summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPageView {
    pub paging: Paging,
    pub reviews: Vec<ReviewView>,
    pub rating_summary: RatingSummaryView,
    /// Average score per reviewed aspect (quality, price, ...).
    pub averages: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummaryView {
    pub total: u64,
    pub average: f64,
    pub distribution: RatingDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub rating: u8,
    pub title: String,
    pub content: String,
    pub date_created: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub reviewer: ReviewerView,
    pub likes: u32,
    pub dislikes: u32,
    pub relevance: Option<f64>,
    pub valorization: ReviewValorization,
    pub buying_date: Option<DateTime<Utc>>,
    pub helpful_count: u32,
    pub not_helpful_count: u32,
    pub images: Vec<ReviewImageView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerView {
    pub id: String,
    pub nickname: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewImageView {
    pub id: Option<String>,
    pub url: String,
    pub thumbnail_url: String,
}

/// Vote counters after marking a review helpful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVotes {
    pub success: bool,
    pub helpful_count: u32,
    pub not_helpful_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAttributeView {
    pub id: String,
    pub name: String,
    pub average: f64,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.clone(),
            rating: review.rating,
            title: review.title.clone(),
            content: review.content.clone(),
            date_created: review.date_created,
            status: review.status.clone(),
            reviewer: ReviewerView {
                id: review.reviewer.id.clone(),
                nickname: review.reviewer.nickname.clone(),
                avatar: review.reviewer.avatar.clone(),
            },
            likes: review.likes,
            dislikes: review.dislikes,
            relevance: review.relevance,
            valorization: review.valorization,
            buying_date: review.buying_date,
            helpful_count: review.helpful_count,
            not_helpful_count: review.not_helpful_count,
            images: review
                .images
                .iter()
                .map(|image| ReviewImageView {
                    id: image.id.clone(),
                    thumbnail_url: optimize_image_url(&image.url, ImageSize::Thumbnail),
                    url: image.url.clone(),
                })
                .collect(),
        }
    }
}

impl From<&ItemReviews> for ReviewPageView {
    fn from(page: &ItemReviews) -> Self {
        Self {
            paging: Paging::new(
                page.total_filtered.unwrap_or(page.total_reviews),
                page.offset,
                page.limit,
            ),
            reviews: page.reviews.iter().map(ReviewView::from).collect(),
            rating_summary: RatingSummaryView {
                total: page.total_reviews,
                average: page.rating_average,
                distribution: page.rating_distribution,
            },
            averages: page.attributes_rating.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ReviewsAdapter {
    services: ServiceResolver,
}

impl ReviewsAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the reviews cannot be fetched.
    pub async fn get_product_reviews(&self, item: &ItemId, limit: u32, offset: u32) -> AdapterResult<ReviewPageView> {
        self.fetch_page(item, ReviewFilters { rating: None, limit, offset }, "product reviews")
            .await
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the reviews cannot be fetched.
    pub async fn get_reviews_filtered(&self, item: &ItemId, filters: ReviewFilters) -> AdapterResult<ReviewPageView> {
        self.fetch_page(item, filters, "filtered reviews").await
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn fetch_page(
        &self,
        item: &ItemId,
        filters: ReviewFilters,
        operation: &'static str,
    ) -> AdapterResult<ReviewPageView> {
        let page = self
            .services
            .call(|services| services.reviews.get_item_reviews(item, filters))
            .await
            .fetching(operation)?;
        Ok(ReviewPageView::from(&page))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the draft is rejected or the
    /// listing does not exist.
    #[instrument(skip(self, draft), fields(item_id = %item, rating = draft.rating))]
    pub async fn create_review(&self, item: &ItemId, draft: &ReviewDraft) -> AdapterResult<ReviewView> {
        let review = self
            .services
            .call(|services| services.reviews.create_review(item, draft))
            .await
            .fetching("review creation")?;
        Ok(ReviewView::from(&review))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the review does not exist.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn mark_helpful(&self, id: &ReviewId, user: &str, helpful: bool) -> AdapterResult<ReviewVotes> {
        let review = self
            .services
            .call(|services| services.reviews.vote_review(id, user, helpful))
            .await
            .fetching("review vote")?;
        Ok(ReviewVotes {
            success: true,
            helpful_count: review.helpful_count,
            not_helpful_count: review.not_helpful_count,
        })
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the lookup fails.
    pub async fn get_review_attributes(&self, item: &ItemId) -> AdapterResult<Vec<ReviewAttributeView>> {
        let attributes = self
            .services
            .call(|services| services.reviews.get_review_attributes(item))
            .await
            .fetching("review attributes")?;
        Ok(attributes
            .into_iter()
            .map(|attr| ReviewAttributeView {
                id: attr.id,
                name: attr.name,
                average: attr.average,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::testing::fixture_resolver;

    const IPHONE: &str = "MCO123456789";

    #[tokio::test]
    async fn test_fixture_review_page() {
        let adapter = ReviewsAdapter::new(fixture_resolver());
        let page = adapter.get_product_reviews(&ItemId::new(IPHONE), 2, 0).await.unwrap();
        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.rating_summary.total, 47);
        assert_eq!(page.paging.limit, 2);
        assert!(page.averages.contains_key("quality"));

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["ratingSummary"]["distribution"]["5"], 34);
        assert!(json["reviews"][0].get("helpfulCount").is_some());
    }

    #[tokio::test]
    async fn test_votes_reflect_counters() {
        let adapter = ReviewsAdapter::new(fixture_resolver());
        let votes = adapter.mark_helpful(&ReviewId::new("rev_001"), "u1", true).await.unwrap();
        assert_eq!(votes.helpful_count, 9);
        let votes = adapter.mark_helpful(&ReviewId::new("rev_001"), "u2", false).await.unwrap();
        assert_eq!((votes.helpful_count, votes.not_helpful_count), (9, 1));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_wrapped() {
        let adapter = ReviewsAdapter::new(fixture_resolver());
        let draft = ReviewDraft {
            rating: 6,
            title: "Bueno".to_owned(),
            ..ReviewDraft::default()
        };
        let err = adapter.create_review(&ItemId::new(IPHONE), &draft).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error fetching review creation: Rating must be between 1 and 5"
        );
    }
}
