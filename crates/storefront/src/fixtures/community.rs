use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use vitrina_core::{
    ItemId, QuestionId, QuestionStatus, ReviewId, ReviewValorization, SellerId, UserId,
};

use super::FixtureBackend;
use crate::marketplace::{
    Answer, Asker, DeletedQuestion, ItemReviews, Paging, Question, QuestionFilters, QuestionPage,
    QuestionStats, Review, ReviewAttribute, ReviewDraft, ReviewFilters, ReviewReport, ReviewStats,
    Reviewer, SellerReviews, SellerStats, User, UserItems, average_rating, page,
};
use crate::services::{
    Payload, QuestionsService, ReviewsService, SellerService, ServiceError, ServiceResult,
};

impl FixtureBackend {
    async fn user(&self, id: SellerId) -> Result<User, ServiceError> {
        self.store
            .read()
            .await
            .user(id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Seller", id))
    }

    async fn item_reviews(&self, item: &ItemId) -> ItemReviews {
        self.store
            .read()
            .await
            .reviews
            .get(item)
            .cloned()
            .unwrap_or_else(|| ItemReviews::empty(item.clone()))
    }
}

#[async_trait]
impl SellerService for FixtureBackend {
    #[instrument(skip(self), fields(seller_id = %id))]
    async fn get_user(&self, id: SellerId) -> ServiceResult<User> {
        self.simulator.call("seller", "get_user").await?;
        self.user(id).await.map(Payload::ok)
    }

    #[instrument(skip(self), fields(seller_id = %id))]
    async fn get_user_items(&self, id: SellerId, limit: u32, offset: u32) -> ServiceResult<UserItems> {
        self.simulator.call("seller", "get_user_items").await?;
        let data = self.store.read().await;
        if data.user(id).is_none() {
            return Err(ServiceError::not_found("Seller", id));
        }
        let items = data.seller_items.get(&id).map(Vec::as_slice).unwrap_or_default();
        Ok(Payload::ok(UserItems {
            seller_id: id,
            query: None,
            paging: Paging::new(items.len() as u64, offset, limit),
            results: page(items, offset, limit),
        }))
    }

    #[instrument(skip(self), fields(seller_id = %id))]
    async fn is_official_store(&self, id: SellerId) -> ServiceResult<bool> {
        self.simulator.call("seller", "is_official_store").await?;
        Ok(Payload::ok(self.user(id).await?.has_tag("eshop")))
    }

    #[instrument(skip(self), fields(seller_id = %id))]
    async fn get_seller_stats(&self, id: SellerId) -> ServiceResult<SellerStats> {
        self.simulator.call("seller", "get_seller_stats").await?;
        Ok(Payload::ok(SellerStats::from(&self.user(id).await?)))
    }
}

#[async_trait]
impl QuestionsService for FixtureBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_item_questions(&self, item: &ItemId, filters: QuestionFilters) -> ServiceResult<QuestionPage> {
        self.simulator.call("questions", "get_item_questions").await?;
        let data = self.store.read().await;
        let matching: Vec<Question> = data
            .questions
            .get(item)
            .into_iter()
            .flatten()
            .filter(|question| filters.status.is_none_or(|status| question.status == status))
            .cloned()
            .collect();
        Ok(Payload::ok(QuestionPage {
            total: matching.len() as u64,
            limit: filters.limit,
            offset: filters.offset,
            questions: page(&matching, filters.offset, filters.limit),
        }))
    }

    #[instrument(skip(self), fields(question_id = %id))]
    async fn get_question(&self, id: QuestionId) -> ServiceResult<Question> {
        self.simulator.call("questions", "get_question").await?;
        self.store
            .read()
            .await
            .question(id)
            .cloned()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Question", id))
    }

    #[instrument(skip(self, text), fields(item_id = %item, user_id = %user))]
    async fn ask_question(&self, item: &ItemId, text: &str, user: UserId) -> ServiceResult<Question> {
        self.simulator.call("questions", "ask_question").await?;
        if text.trim().is_empty() {
            return Err(ServiceError::Validation("Question text is required".to_owned()));
        }

        let mut data = self.store.write().await;
        let seller = data
            .item(item)
            .map(|listing| listing.seller_id)
            .ok_or_else(|| ServiceError::not_found("Product", item))?;
        let question = Question {
            id: data.next_question_id(),
            text: text.trim().to_owned(),
            status: QuestionStatus::Unanswered,
            date_created: Some(Utc::now()),
            item_id: item.clone(),
            seller_id: Some(seller),
            from: Some(Asker {
                id: user,
                answered_questions: 0,
            }),
            ..Question::default()
        };
        data.questions
            .entry(item.clone())
            .or_default()
            .insert(0, question.clone());

        info!(question_id = %question.id, "Question stored");
        Ok(Payload::ok(question))
    }

    #[instrument(skip(self, text), fields(question_id = %id))]
    async fn answer_question(&self, id: QuestionId, text: &str) -> ServiceResult<Question> {
        self.simulator.call("questions", "answer_question").await?;
        let mut data = self.store.write().await;
        let question = data
            .question_mut(id)
            .ok_or_else(|| ServiceError::not_found("Question", id))?;
        question.status = QuestionStatus::Answered;
        question.answer = Some(Answer {
            text: text.to_owned(),
            status: "ACTIVE".to_owned(),
            date_created: Some(Utc::now()),
        });
        Ok(Payload::ok(question.clone()))
    }

    #[instrument(skip(self), fields(question_id = %id, user_id = %user))]
    async fn delete_question(&self, id: QuestionId, user: UserId) -> ServiceResult<DeletedQuestion> {
        self.simulator.call("questions", "delete_question").await?;
        let mut data = self.store.write().await;
        let mut removed = false;
        for questions in data.questions.values_mut() {
            let before = questions.len();
            questions.retain(|question| question.id != id);
            removed |= questions.len() != before;
        }
        if !removed {
            return Err(ServiceError::not_found("Question", id));
        }
        Ok(Payload::ok(DeletedQuestion { id, deleted: true }))
    }

    #[instrument(skip(self), fields(seller_id = %seller))]
    async fn get_seller_questions(
        &self,
        seller: SellerId,
        status: Option<QuestionStatus>,
    ) -> ServiceResult<QuestionPage> {
        self.simulator.call("questions", "get_seller_questions").await?;
        let data = self.store.read().await;
        let questions: Vec<Question> = data
            .all_questions()
            .filter(|question| question.seller_id == Some(seller))
            .filter(|question| status.is_none_or(|status| question.status == status))
            .cloned()
            .collect();
        let total = questions.len();
        Ok(Payload::ok(QuestionPage {
            total: total as u64,
            limit: u32::try_from(total).unwrap_or(u32::MAX),
            offset: 0,
            questions,
        }))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_question_stats(&self, item: &ItemId) -> ServiceResult<QuestionStats> {
        self.simulator.call("questions", "get_question_stats").await?;
        let data = self.store.read().await;
        let questions = data.questions.get(item).map(Vec::as_slice).unwrap_or_default();
        Ok(Payload::ok(QuestionStats::from_questions(questions)))
    }
}

#[async_trait]
impl ReviewsService for FixtureBackend {
    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_item_reviews(&self, item: &ItemId, filters: ReviewFilters) -> ServiceResult<ItemReviews> {
        self.simulator.call("reviews", "get_item_reviews").await?;
        let mut reviews = self.item_reviews(item).await;
        if let Some(rating) = filters.rating {
            reviews.reviews.retain(|review| review.rating == rating);
            reviews.total_filtered = Some(reviews.reviews.len() as u64);
        }
        reviews.reviews = page(&reviews.reviews, filters.offset, filters.limit);
        reviews.offset = filters.offset;
        reviews.limit = filters.limit;
        Ok(Payload::ok(reviews))
    }

    #[instrument(skip(self), fields(review_id = %id))]
    async fn get_review(&self, id: &ReviewId) -> ServiceResult<Review> {
        self.simulator.call("reviews", "get_review").await?;
        self.store
            .read()
            .await
            .review(id)
            .cloned()
            .map(Payload::ok)
            .ok_or_else(|| ServiceError::not_found("Review", id))
    }

    #[instrument(skip(self, draft), fields(item_id = %item, rating = draft.rating))]
    async fn create_review(&self, item: &ItemId, draft: &ReviewDraft) -> ServiceResult<Review> {
        self.simulator.call("reviews", "create_review").await?;
        draft.validate().map_err(ServiceError::Validation)?;

        let mut data = self.store.write().await;
        if data.item(item).is_none() {
            return Err(ServiceError::not_found("Product", item));
        }
        let review = Review {
            id: ReviewId::new(format!("rev_{}", Uuid::new_v4().simple())),
            rating: draft.rating,
            title: draft.title.trim().to_owned(),
            content: draft.content.clone(),
            date_created: Some(Utc::now()),
            reviewer: Reviewer {
                id: draft.user_id.clone(),
                nickname: draft
                    .user_nickname
                    .clone()
                    .unwrap_or_else(|| "Usuario".to_owned()),
                ..Reviewer::default()
            },
            images: draft.images.clone(),
            valorization: ReviewValorization::from_rating(draft.rating),
            status: Some("ACTIVE".to_owned()),
            ..Review::default()
        };

        let summary = data
            .reviews
            .entry(item.clone())
            .or_insert_with(|| ItemReviews::empty(item.clone()));
        summary.reviews.insert(0, review.clone());
        summary.total_reviews += 1;
        summary.rating_distribution.record(review.rating);
        summary.recompute_average();

        info!(review_id = %review.id, "Review stored");
        Ok(Payload::ok(review))
    }

    #[instrument(skip(self), fields(review_id = %id))]
    async fn vote_review(&self, id: &ReviewId, user: &str, helpful: bool) -> ServiceResult<Review> {
        self.simulator.call("reviews", "vote_review").await?;
        let mut data = self.store.write().await;
        let review = data
            .review_mut(id)
            .ok_or_else(|| ServiceError::not_found("Review", id))?;
        if helpful {
            review.likes += 1;
            review.helpful_count += 1;
        } else {
            review.dislikes += 1;
            review.not_helpful_count += 1;
        }
        Ok(Payload::ok(review.clone()))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_review_attributes(&self, item: &ItemId) -> ServiceResult<Vec<ReviewAttribute>> {
        self.simulator.call("reviews", "get_review_attributes").await?;
        let reviews = self.item_reviews(item).await;
        Ok(Payload::ok(ReviewAttribute::from_ratings(&reviews.attributes_rating)))
    }

    #[instrument(skip(self, reason), fields(review_id = %id))]
    async fn report_review(&self, id: &ReviewId, reason: &str) -> ServiceResult<ReviewReport> {
        self.simulator.call("reviews", "report_review").await?;
        if self.store.read().await.review(id).is_none() {
            return Err(ServiceError::not_found("Review", id));
        }
        Ok(Payload::ok(ReviewReport {
            id: format!("report_{}", Uuid::new_v4().simple()),
            review_id: id.clone(),
            reason: reason.to_owned(),
            status: "pending".to_owned(),
            date_created: Some(Utc::now()),
        }))
    }

    #[instrument(skip(self), fields(seller_id = %seller))]
    async fn get_seller_reviews(&self, seller: SellerId) -> ServiceResult<SellerReviews> {
        self.simulator.call("reviews", "get_seller_reviews").await?;
        let data = self.store.read().await;
        if data.user(seller).is_none() {
            return Err(ServiceError::not_found("Seller", seller));
        }
        let reviews: Vec<Review> = data
            .items_of(seller)
            .filter_map(|item| data.reviews.get(&item.id))
            .flat_map(|page| page.reviews.iter().cloned())
            .collect();
        Ok(Payload::ok(SellerReviews {
            seller_id: seller,
            rating_average: average_rating(&reviews),
            total_reviews: reviews.len() as u64,
            reviews,
        }))
    }

    #[instrument(skip(self), fields(item_id = %item))]
    async fn get_review_stats(&self, item: &ItemId) -> ServiceResult<ReviewStats> {
        self.simulator.call("reviews", "get_review_stats").await?;
        let reviews = self.item_reviews(item).await;
        let mut stats = ReviewStats::from_reviews(&reviews.reviews, Utc::now());
        stats.attributes_rating = reviews.attributes_rating;
        Ok(Payload::ok(stats))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::SiteId;

    use super::*;

    const IPHONE: &str = "MCO123456789";

    fn backend() -> FixtureBackend {
        FixtureBackend::instant(SiteId::Mco).unwrap()
    }

    fn draft(rating: u8, title: &str) -> ReviewDraft {
        ReviewDraft {
            rating,
            title: title.to_owned(),
            content: "Muy buen equipo".to_owned(),
            user_id: "buyer_1".to_owned(),
            ..ReviewDraft::default()
        }
    }

    #[tokio::test]
    async fn test_unknown_seller_is_not_found() {
        let backend = backend();
        let err = backend.get_user(SellerId::new(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Seller with id 1 not found");
        assert!(backend.get_user_items(SellerId::new(1), 10, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_seller_items_and_official_store() {
        let backend = backend();
        let seller = SellerId::new(123_456);
        let items = backend.get_user_items(seller, 1, 0).await.unwrap().data;
        assert_eq!(items.paging.total, 2);
        assert_eq!(items.results.len(), 1);
        assert!(backend.is_official_store(seller).await.unwrap().data);
        assert!(!backend.is_official_store(SellerId::new(987_654)).await.unwrap().data);
    }

    #[tokio::test]
    async fn test_ask_then_answer_question() {
        let backend = backend();
        let item = ItemId::new(IPHONE);
        let asked = backend
            .ask_question(&item, "¿Tiene garantía?", UserId::new(42))
            .await
            .unwrap()
            .data;
        assert_eq!(asked.status, QuestionStatus::Unanswered);

        let first = backend
            .get_item_questions(&item, QuestionFilters::default())
            .await
            .unwrap()
            .data;
        assert_eq!(first.questions[0].id, asked.id);
        assert_eq!(first.total, 6);

        let answered = backend.answer_question(asked.id, "Sí, 12 meses").await.unwrap().data;
        assert_eq!(answered.status, QuestionStatus::Answered);
        assert_eq!(answered.answer.unwrap().status, "ACTIVE");
    }

    #[tokio::test]
    async fn test_question_status_filter_and_stats() {
        let backend = backend();
        let item = ItemId::new(IPHONE);
        let filters = QuestionFilters {
            status: Some(QuestionStatus::Unanswered),
            ..QuestionFilters::default()
        };
        let pending = backend.get_item_questions(&item, filters).await.unwrap().data;
        assert_eq!(pending.total, 1);

        let stats = backend.get_question_stats(&item).await.unwrap().data;
        assert_eq!(stats.total_questions, 5);
        assert_eq!(stats.pending_questions, 1);
    }

    #[tokio::test]
    async fn test_delete_question() {
        let backend = backend();
        let id = QuestionId::new(12_345_005);
        let deleted = backend.delete_question(id, UserId::new(1)).await.unwrap().data;
        assert!(deleted.deleted);
        assert!(backend.get_question(id).await.is_err());
        assert!(backend.delete_question(id, UserId::new(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_review_does_not_mutate() {
        let backend = backend();
        let item = ItemId::new(IPHONE);
        let before = backend.store().read().await.reviews.get(&item).cloned();

        let err = backend.create_review(&item, &draft(6, "Bueno")).await.unwrap_err();
        assert_eq!(err.to_string(), "Rating must be between 1 and 5");
        let err = backend.create_review(&item, &draft(5, " ")).await.unwrap_err();
        assert_eq!(err.to_string(), "Title is required");

        assert_eq!(backend.store().read().await.reviews.get(&item).cloned(), before);
    }

    #[tokio::test]
    async fn test_create_review_updates_summary() {
        let backend = backend();
        let item = ItemId::new(IPHONE);
        let review = backend.create_review(&item, &draft(1, "Malo")).await.unwrap().data;
        assert_eq!(review.valorization, ReviewValorization::Negative);

        let page = backend.get_item_reviews(&item, ReviewFilters::default()).await.unwrap().data;
        assert_eq!(page.reviews[0].id, review.id);
        assert_eq!(page.total_reviews, 48);
        assert_eq!(page.rating_distribution.count(1), 2);
        // (5 + 5 + 4 + 5 + 3 + 1) / 6
        assert!((page.rating_average - 3.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_votes_bump_counters() {
        let backend = backend();
        let id = ReviewId::new("rev_001");
        let liked = backend.vote_review(&id, "u1", true).await.unwrap().data;
        assert_eq!((liked.likes, liked.helpful_count), (13, 9));
        let disliked = backend.vote_review(&id, "u1", false).await.unwrap().data;
        assert_eq!((disliked.dislikes, disliked.not_helpful_count), (1, 1));
    }

    #[tokio::test]
    async fn test_rating_filter_sets_total_filtered() {
        let filters = ReviewFilters {
            rating: Some(5),
            ..ReviewFilters::default()
        };
        let page = backend()
            .get_item_reviews(&ItemId::new(IPHONE), filters)
            .await
            .unwrap()
            .data;
        assert_eq!(page.total_filtered, Some(3));
        assert!(page.reviews.iter().all(|r| r.rating == 5));
    }

    #[tokio::test]
    async fn test_review_attributes_and_seller_reviews() {
        let backend = backend();
        let attributes = backend
            .get_review_attributes(&ItemId::new(IPHONE))
            .await
            .unwrap()
            .data;
        assert!(attributes.iter().any(|a| a.name == "Calidad"));

        let seller = backend.get_seller_reviews(SellerId::new(987_654)).await.unwrap().data;
        assert_eq!(seller.total_reviews, 3);
        assert!((seller.rating_average - 4.0).abs() < f64::EPSILON);
    }
}
