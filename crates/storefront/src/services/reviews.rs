use async_trait::async_trait;
use vitrina_core::{ItemId, ReviewId, SellerId};

use super::ServiceResult;
use crate::marketplace::{
    ItemReviews, Review, ReviewAttribute, ReviewDraft, ReviewFilters, ReviewReport, ReviewStats,
    SellerReviews,
};

#[async_trait]
pub trait ReviewsService: Send + Sync {
    async fn get_item_reviews(&self, item: &ItemId, filters: ReviewFilters) -> ServiceResult<ItemReviews>;

    async fn get_review(&self, id: &ReviewId) -> ServiceResult<Review>;

    /// Publish a review. Invalid drafts fail with `Validation` and change nothing.
    async fn create_review(&self, item: &ItemId, draft: &ReviewDraft) -> ServiceResult<Review>;

    /// Record a helpful (`true`) or not helpful vote.
    async fn vote_review(&self, id: &ReviewId, user: &str, helpful: bool) -> ServiceResult<Review>;

    async fn get_review_attributes(&self, item: &ItemId) -> ServiceResult<Vec<ReviewAttribute>>;

    async fn report_review(&self, id: &ReviewId, reason: &str) -> ServiceResult<ReviewReport>;

    async fn get_seller_reviews(&self, seller: SellerId) -> ServiceResult<SellerReviews>;

    async fn get_review_stats(&self, item: &ItemId) -> ServiceResult<ReviewStats>;
}
