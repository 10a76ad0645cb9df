use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{ItemId, Responsiveness, UserId};

use super::{ConcernContext, UseCaseResult};
use crate::adapters::{QuestionStatsView, QuestionView, QuestionsAdapter};

const CONCERN: &str = "product questions";
const DEFAULT_LIMIT: u32 = 10;
const TOP_TOPICS: usize = 5;

const TOPIC_KEYWORDS: [&str; 22] = [
    "envío", "entrega", "shipping", "delivery", "precio", "price", "costo", "cost", "garantía",
    "warranty", "guarantee", "color", "tamaño", "size", "medidas", "stock", "disponible",
    "available", "pago", "payment", "cuotas", "installments",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuestions {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub questions: Vec<QuestionView>,
    pub stats: QuestionStatsView,
    pub has_questions: bool,
    pub categorized: CategorizedQuestions,
    pub summary: QuestionsSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorizedQuestions {
    pub answered: Vec<QuestionView>,
    pub pending: Vec<QuestionView>,
    /// Asked within the last 24 hours.
    pub recent: Vec<QuestionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsSummary {
    pub total_questions: u64,
    pub answered_questions: u64,
    pub pending_questions: u64,
    pub response_rate: f64,
    pub average_response_time: Option<f64>,
    pub most_common_topics: Vec<TopicCount>,
    pub responsiveness: Responsiveness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSubmission {
    pub success: bool,
    pub question: QuestionView,
    pub message: String,
}

fn categorize(questions: &[QuestionView], now: DateTime<Utc>) -> CategorizedQuestions {
    let cutoff = now - Duration::hours(24);
    let mut categorized = CategorizedQuestions::default();
    for question in questions {
        if question.is_answered() {
            categorized.answered.push(question.clone());
        } else {
            categorized.pending.push(question.clone());
        }
        if question.date_created.is_some_and(|date| date > cutoff) {
            categorized.recent.push(question.clone());
        }
    }
    categorized
}

/// Keywords from a fixed topic list, counted once per question, most
/// frequent first. Ties keep the keyword list order.
fn common_topics(questions: &[QuestionView]) -> Vec<TopicCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for question in questions {
        let text = question.text.to_lowercase();
        for keyword in TOPIC_KEYWORDS {
            if text.contains(keyword) {
                *counts.entry(keyword).or_default() += 1;
            }
        }
    }
    let mut topics: Vec<TopicCount> = TOPIC_KEYWORDS
        .iter()
        .filter_map(|keyword| {
            counts.get(keyword).map(|&count| TopicCount {
                topic: (*keyword).to_owned(),
                count,
            })
        })
        .collect();
    topics.sort_by(|a, b| b.count.cmp(&a.count));
    topics.truncate(TOP_TOPICS);
    topics
}

fn summarize(questions: &[QuestionView], stats: &QuestionStatsView) -> QuestionsSummary {
    QuestionsSummary {
        total_questions: stats.total_questions,
        answered_questions: stats.answered_questions,
        pending_questions: stats.pending_questions,
        response_rate: stats.response_rate,
        average_response_time: stats.average_response_time,
        most_common_topics: common_topics(questions),
        responsiveness: Responsiveness::from_metrics(
            stats.total_questions,
            stats.response_rate,
            stats.average_response_time.unwrap_or(f64::INFINITY),
        ),
    }
}

#[derive(Clone)]
pub struct GetProductQuestions {
    questions: QuestionsAdapter,
}

impl GetProductQuestions {
    #[must_use]
    pub const fn new(questions: QuestionsAdapter) -> Self {
        Self { questions }
    }

    /// One page of questions (10 by default) with stats and summaries.
    ///
    /// # Errors
    ///
    /// Fails when the questions or the stats cannot be fetched.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn execute(&self, item: &ItemId, limit: Option<u32>, offset: Option<u32>) -> UseCaseResult<ProductQuestions> {
        let page = self
            .questions
            .get_product_questions(item, limit.unwrap_or(DEFAULT_LIMIT), offset.unwrap_or(0))
            .await
            .concerning(CONCERN)?;
        let stats = self
            .questions
            .get_question_stats(item)
            .await
            .concerning(CONCERN)?;

        Ok(ProductQuestions {
            has_questions: page.total > 0,
            categorized: categorize(&page.questions, Utc::now()),
            summary: summarize(&page.questions, &stats),
            stats,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            questions: page.questions,
        })
    }

    /// # Errors
    ///
    /// Fails when the text is blank or the listing does not exist.
    #[instrument(skip(self, text), fields(item_id = %item, user_id = %user))]
    pub async fn ask_question(&self, item: &ItemId, text: &str, user: UserId) -> UseCaseResult<QuestionSubmission> {
        let question = self
            .questions
            .ask_question(item, text, user)
            .await
            .concerning("question submission")?;
        Ok(QuestionSubmission {
            success: true,
            question,
            message: "Pregunta enviada correctamente".to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::{QuestionId, QuestionStatus};

    use super::*;
    use crate::adapters::AnswerView;
    use crate::usecases::testing::fixture_use_cases;

    fn question(text: &str, answered: bool, date: DateTime<Utc>) -> QuestionView {
        QuestionView {
            id: QuestionId::new(1),
            text: text.to_owned(),
            status: QuestionStatus::Unanswered,
            date_created: Some(date),
            item_id: ItemId::new("MCO1"),
            from: None,
            answer: answered.then(|| AnswerView {
                text: "Sí".to_owned(),
                status: "ACTIVE".to_owned(),
                date_created: None,
            }),
        }
    }

    #[test]
    fn test_categorize() {
        let now = Utc::now();
        let questions = vec![
            question("a", true, now - Duration::hours(2)),
            question("b", false, now - Duration::days(3)),
        ];
        let categorized = categorize(&questions, now);
        assert_eq!(categorized.answered.len(), 1);
        assert_eq!(categorized.pending.len(), 1);
        assert_eq!(categorized.recent.len(), 1);
        assert_eq!(categorized.recent[0].text, "a");
    }

    #[test]
    fn test_common_topics_count_once_per_question() {
        let now = Utc::now();
        let questions = vec![
            question("¿Precio del envío? precio final", false, now),
            question("¿Hacen envío a Cali?", false, now),
            question("¿Tiene garantía?", false, now),
        ];
        let topics = common_topics(&questions);
        assert_eq!(topics[0], TopicCount { topic: "envío".to_owned(), count: 2 });
        assert_eq!(topics.len(), 3);
    }

    #[test]
    fn test_responsiveness_without_answer_times() {
        let stats = QuestionStatsView {
            total_questions: 4,
            answered_questions: 4,
            pending_questions: 0,
            response_rate: 100.0,
            average_response_time: None,
        };
        assert_eq!(summarize(&[], &stats).responsiveness, Responsiveness::Average);
    }

    #[tokio::test]
    async fn test_fixture_questions() {
        let result = fixture_use_cases()
            .questions
            .execute(&ItemId::new("MCO123456789"), None, None)
            .await
            .unwrap();
        assert!(result.has_questions);
        assert_eq!(result.limit, 10);
        assert_eq!(result.categorized.answered.len(), 4);
        assert_eq!(result.categorized.pending.len(), 1);
        assert!(result.categorized.recent.is_empty());
        assert_eq!(result.summary.pending_questions, 1);
    }

    #[tokio::test]
    async fn test_ask_question_message() {
        let submission = fixture_use_cases()
            .questions
            .ask_question(&ItemId::new("MCO123456789"), "¿Viene sellado?", UserId::new(7))
            .await
            .unwrap();
        assert!(submission.success);
        assert_eq!(submission.message, "Pregunta enviada correctamente");
    }
}
