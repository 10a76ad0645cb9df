use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;
use vitrina_core::{ItemId, QuestionId, QuestionStatus, ReviewId, SellerId, UserId};

use super::LiveBackend;
use crate::api::endpoints;
use crate::marketplace::{
    DeletedQuestion, ItemReviews, Question, QuestionFilters, QuestionPage, QuestionStats, Review,
    ReviewAttribute, ReviewDraft, ReviewFilters, ReviewReport, ReviewStats, SellerReviews,
    SellerStats, User, UserItems,
};
use crate::services::{
    NotFoundExt, Payload, QuestionsService, ReviewsService, SellerService, ServiceError,
    ServiceResult,
};

impl LiveBackend {
    async fn fetch_user(&self, id: SellerId) -> Result<User, ServiceError> {
        self.client
            .get(&endpoints::user(id))
            .await
            .or_not_found("Seller", id)
    }

    async fn fetch_item_reviews(&self, item: &ItemId, filters: ReviewFilters) -> Result<ItemReviews, ServiceError> {
        let mut reviews: ItemReviews = self
            .client
            .get(&endpoints::item_reviews(item, filters.limit, filters.offset))
            .await
            .or_not_found("Product", item)?;
        if reviews.item_id.as_str().is_empty() {
            reviews.item_id = item.clone();
        }
        if let Some(rating) = filters.rating {
            reviews.reviews.retain(|review| review.rating == rating);
            reviews.total_filtered = Some(reviews.reviews.len() as u64);
        }
        Ok(reviews)
    }
}

#[async_trait]
impl SellerService for LiveBackend {
    #[instrument(skip(self), fields(seller_id = %id))]
    async fn get_user(&self, id: SellerId) -> ServiceResult<User> {
        self.fetch_user(id).await.map(Payload::ok)
    }

    // Results are expected as listing objects; the endpoint may also answer
    // with bare ids depending on the caller's scope.
    #[instrument(skip(self), fields(seller_id = %id))]
    async fn get_user_items(&self, id: SellerId, limit: u32, offset: u32) -> ServiceResult<UserItems> {
        let mut items: UserItems = self
            .client
            .get(&endpoints::user_items(id, limit, offset))
            .await
            .or_not_found("Seller", id)?;
        items.seller_id = id;
        Ok(Payload::ok(items))
    }

    #[instrument(skip(self), fields(seller_id = %id))]
    async fn is_official_store(&self, id: SellerId) -> ServiceResult<bool> {
        let user = self.fetch_user(id).await?;
        Ok(Payload::ok(user.has_tag("eshop")))
    }

    #[instrument(skip(self), fields(seller_id = %id))]
    async fn get_seller_stats(&self, id: SellerId) -> ServiceResult<SellerStats> {
        let user = self.fetch_user(id).await?;
        Ok(Payload::ok(SellerStats::from(&user)))
    }
}

#[async_trait]
impl QuestionsService for LiveBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_item_questions(&self, item: &ItemId, filters: QuestionFilters) -> ServiceResult<QuestionPage> {
        let page = self
            .client
            .get(&endpoints::item_questions(item, filters.status, filters.limit, filters.offset))
            .await?;
        Ok(Payload::ok(page))
    }

    #[instrument(skip(self), fields(question_id = %id))]
    async fn get_question(&self, id: QuestionId) -> ServiceResult<Question> {
        self.client
            .get(&endpoints::question(id))
            .await
            .or_not_found("Question", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self, text), fields(item_id = %item, user_id = %user))]
    async fn ask_question(&self, item: &ItemId, text: &str, user: UserId) -> ServiceResult<Question> {
        let body = json!({ "item_id": item, "text": text, "from": { "id": user } });
        let question = self.client.post(endpoints::QUESTIONS, &body).await?;
        Ok(Payload::ok(question))
    }

    #[instrument(skip(self, text), fields(question_id = %id))]
    async fn answer_question(&self, id: QuestionId, text: &str) -> ServiceResult<Question> {
        let body = json!({ "question_id": id, "text": text });
        self.client
            .post(endpoints::ANSWERS, &body)
            .await
            .or_not_found("Question", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(question_id = %id, user_id = %user))]
    async fn delete_question(&self, id: QuestionId, user: UserId) -> ServiceResult<DeletedQuestion> {
        let _: Value = self
            .client
            .delete(&endpoints::delete_question(id, user))
            .await
            .or_not_found("Question", id)?;
        Ok(Payload::ok(DeletedQuestion { id, deleted: true }))
    }

    #[instrument(skip(self), fields(seller_id = %seller))]
    async fn get_seller_questions(
        &self,
        seller: SellerId,
        status: Option<QuestionStatus>,
    ) -> ServiceResult<QuestionPage> {
        let page = self
            .client
            .get(&endpoints::seller_questions(seller, status))
            .await?;
        Ok(Payload::ok(page))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_question_stats(&self, item: &ItemId) -> ServiceResult<QuestionStats> {
        let filters = QuestionFilters::default();
        let page: QuestionPage = self
            .client
            .get(&endpoints::item_questions(item, None, filters.limit, filters.offset))
            .await?;
        Ok(Payload::ok(QuestionStats::from_questions(&page.questions)))
    }
}

#[async_trait]
impl ReviewsService for LiveBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_item_reviews(&self, item: &ItemId, filters: ReviewFilters) -> ServiceResult<ItemReviews> {
        self.fetch_item_reviews(item, filters).await.map(Payload::ok)
    }

    #[instrument(skip(self), fields(review_id = %id))]
    async fn get_review(&self, id: &ReviewId) -> ServiceResult<Review> {
        self.client
            .get(&endpoints::review(id))
            .await
            .or_not_found("Review", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self, draft), fields(item_id = %item, rating = draft.rating))]
    async fn create_review(&self, item: &ItemId, draft: &ReviewDraft) -> ServiceResult<Review> {
        draft.validate().map_err(ServiceError::Validation)?;
        let body = json!({
            "item_id": item,
            "rating": draft.rating,
            "title": draft.title,
            "content": draft.content,
            "images": draft.images,
            "reviewer": { "id": draft.user_id, "nickname": draft.user_nickname },
        });
        let review = self.client.post(endpoints::REVIEWS, &body).await?;
        Ok(Payload::ok(review))
    }

    #[instrument(skip(self), fields(review_id = %id))]
    async fn vote_review(&self, id: &ReviewId, user: &str, helpful: bool) -> ServiceResult<Review> {
        let body = json!({ "user_id": user });
        self.client
            .post(&endpoints::review_vote(id, helpful), &body)
            .await
            .or_not_found("Review", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_review_attributes(&self, item: &ItemId) -> ServiceResult<Vec<ReviewAttribute>> {
        let ratings: BTreeMap<String, f64> = self
            .client
            .get(&endpoints::review_attributes(item))
            .await
            .or_not_found("Product", item)?;
        Ok(Payload::ok(ReviewAttribute::from_ratings(&ratings)))
    }

    #[instrument(skip(self), fields(review_id = %id))]
    async fn report_review(&self, id: &ReviewId, reason: &str) -> ServiceResult<ReviewReport> {
        let body = json!({ "reason": reason });
        self.client
            .post(&endpoints::review_report(id), &body)
            .await
            .or_not_found("Review", id)
            .map(Payload::ok)
    }

    #[instrument(skip(self), fields(seller_id = %seller))]
    async fn get_seller_reviews(&self, seller: SellerId) -> ServiceResult<SellerReviews> {
        let mut reviews: SellerReviews = self
            .client
            .get(&endpoints::seller_reviews(seller))
            .await
            .or_not_found("Seller", seller)?;
        reviews.seller_id = seller;
        Ok(Payload::ok(reviews))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_review_stats(&self, item: &ItemId) -> ServiceResult<ReviewStats> {
        let filters = ReviewFilters {
            limit: 50,
            ..ReviewFilters::default()
        };
        let page = self.fetch_item_reviews(item, filters).await?;
        let mut stats = ReviewStats::from_reviews(&page.reviews, Utc::now());
        stats.attributes_rating = page.attributes_rating;
        Ok(Payload::ok(stats))
    }
}
