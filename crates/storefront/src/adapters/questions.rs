use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{ItemId, QuestionId, QuestionStatus, UserId};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{Question, QuestionFilters, QuestionPage, QuestionStats};
use crate::services::ServiceResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionPageView {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub status: QuestionStatus,
    pub date_created: Option<DateTime<Utc>>,
    pub item_id: ItemId,
    pub from: Option<AskerView>,
    pub answer: Option<AnswerView>,
}

impl QuestionView {
    #[must_use]
    pub const fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskerView {
    pub id: UserId,
    pub answered_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerView {
    pub text: String,
    pub status: String,
    pub date_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStatsView {
    pub total_questions: u64,
    pub answered_questions: u64,
    pub pending_questions: u64,
    pub response_rate: f64,
    pub average_response_time: Option<f64>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            status: question.status,
            date_created: question.date_created,
            item_id: question.item_id.clone(),
            from: question.from.as_ref().map(|asker| AskerView {
                id: asker.id,
                answered_questions: asker.answered_questions,
            }),
            answer: question.answer.as_ref().map(|answer| AnswerView {
                text: answer.text.clone(),
                status: answer.status.clone(),
                date_created: answer.date_created,
            }),
        }
    }
}

impl From<QuestionPage> for QuestionPageView {
    fn from(page: QuestionPage) -> Self {
        Self {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            questions: page.questions.iter().map(QuestionView::from).collect(),
        }
    }
}

impl From<QuestionStats> for QuestionStatsView {
    fn from(stats: QuestionStats) -> Self {
        Self {
            total_questions: stats.total_questions,
            answered_questions: stats.answered_questions,
            pending_questions: stats.pending_questions,
            response_rate: stats.response_rate,
            average_response_time: stats.average_response_time,
        }
    }
}

#[derive(Clone)]
pub struct QuestionsAdapter {
    services: ServiceResolver,
}

impl QuestionsAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the questions cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn get_product_questions(&self, item: &ItemId, limit: u32, offset: u32) -> AdapterResult<QuestionPageView> {
        let filters = QuestionFilters {
            status: None,
            limit,
            offset,
        };
        let page = self
            .services
            .call(|services| services.questions.get_item_questions(item, filters))
            .await
            .fetching("product questions")?;
        Ok(QuestionPageView::from(page))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the text is blank or the listing
    /// does not exist.
    #[instrument(skip(self, text), fields(item_id = %item, user_id = %user))]
    pub async fn ask_question(&self, item: &ItemId, text: &str, user: UserId) -> AdapterResult<QuestionView> {
        let question = self
            .services
            .call(|services| services.questions.ask_question(item, text, user))
            .await
            .fetching("question submission")?;
        Ok(QuestionView::from(&question))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the stats cannot be computed.
    pub async fn get_question_stats(&self, item: &ItemId) -> AdapterResult<QuestionStatsView> {
        let stats = self
            .services
            .call(|services| services.questions.get_question_stats(item))
            .await
            .fetching("question stats")?;
        Ok(QuestionStatsView::from(stats))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::testing::fixture_resolver;

    const IPHONE: &str = "MCO123456789";

    #[tokio::test]
    async fn test_fixture_questions() {
        let adapter = QuestionsAdapter::new(fixture_resolver());
        let page = adapter.get_product_questions(&ItemId::new(IPHONE), 10, 0).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.questions.iter().filter(|q| q.is_answered()).count(), 4);

        let json = serde_json::to_value(&page).unwrap();
        assert!(json["questions"][0].get("dateCreated").is_some());
    }

    #[tokio::test]
    async fn test_stats_are_camel_case() {
        let adapter = QuestionsAdapter::new(fixture_resolver());
        let stats = adapter.get_question_stats(&ItemId::new(IPHONE)).await.unwrap();
        assert_eq!(stats.pending_questions, 1);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["responseRate"], 80.0);
    }

    #[tokio::test]
    async fn test_ask_then_list() {
        let adapter = QuestionsAdapter::new(fixture_resolver());
        let item = ItemId::new(IPHONE);
        let asked = adapter
            .ask_question(&item, "  ¿Tiene factura?  ", UserId::new(42))
            .await
            .unwrap();
        assert_eq!(asked.text, "¿Tiene factura?");
        assert!(!asked.is_answered());

        let page = adapter.get_product_questions(&item, 50, 0).await.unwrap();
        assert_eq!(page.total, 6);

        let err = adapter.ask_question(&item, " ", UserId::new(42)).await.unwrap_err();
        assert_eq!(err.operation, "question submission");
    }
}
