use async_trait::async_trait;
use vitrina_core::{ItemId, QuestionId, QuestionStatus, SellerId, UserId};

use super::ServiceResult;
use crate::marketplace::{DeletedQuestion, Question, QuestionFilters, QuestionPage, QuestionStats};

/// Buyer questions and seller answers.
#[async_trait]
pub trait QuestionsService: Send + Sync {
    async fn get_item_questions(
        &self,
        item: &ItemId,
        filters: QuestionFilters,
    ) -> ServiceResult<QuestionPage>;

    async fn get_question(&self, id: QuestionId) -> ServiceResult<Question>;

    async fn ask_question(&self, item: &ItemId, text: &str, user: UserId) -> ServiceResult<Question>;

    async fn answer_question(&self, id: QuestionId, text: &str) -> ServiceResult<Question>;

    async fn delete_question(&self, id: QuestionId, user: UserId) -> ServiceResult<DeletedQuestion>;

    async fn get_seller_questions(
        &self,
        seller: SellerId,
        status: Option<QuestionStatus>,
    ) -> ServiceResult<QuestionPage>;

    async fn get_question_stats(&self, item: &ItemId) -> ServiceResult<QuestionStats>;
}
