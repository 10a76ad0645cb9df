use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrina_core::{ItemId, QuestionId, QuestionStatus, SellerId, UserId};

/// A buyer question on a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub status: QuestionStatus,
    pub date_created: Option<DateTime<Utc>>,
    pub item_id: ItemId,
    pub seller_id: Option<SellerId>,
    pub from: Option<Asker>,
    pub answer: Option<Answer>,
    pub deleted_from_listing: bool,
    pub hold: bool,
    pub tags: Vec<String>,
}

impl Question {
    /// Hours between asking and the answer, when answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn response_hours(&self) -> Option<f64> {
        let asked = self.date_created?;
        let answered = self.answer.as_ref()?.date_created?;
        Some((answered - asked).num_seconds() as f64 / 3600.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asker {
    pub id: UserId,
    pub answered_questions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answer {
    pub text: String,
    pub status: String,
    pub date_created: Option<DateTime<Utc>>,
}

/// One page of a listing's questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionPage {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub questions: Vec<Question>,
}

/// Status filter plus pagination. `status: None` means all statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionFilters {
    pub status: Option<QuestionStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for QuestionFilters {
    fn default() -> Self {
        Self {
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Aggregate answer figures for one listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub total_questions: u64,
    pub answered_questions: u64,
    pub pending_questions: u64,
    /// Percent of questions answered, rounded.
    pub response_rate: f64,
    /// Mean hours to answer, rounded; `None` when nothing was answered.
    pub average_response_time: Option<f64>,
}

impl QuestionStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_questions(questions: &[Question]) -> Self {
        let total = questions.len() as u64;
        let answered = questions
            .iter()
            .filter(|q| q.status == QuestionStatus::Answered)
            .count() as u64;
        let pending = questions
            .iter()
            .filter(|q| q.status == QuestionStatus::Unanswered)
            .count() as u64;
        let response_rate = if total == 0 {
            0.0
        } else {
            (answered as f64 / total as f64 * 100.0).round()
        };
        let hours: Vec<f64> = questions.iter().filter_map(Question::response_hours).collect();
        let average_response_time =
            (!hours.is_empty()).then(|| (hours.iter().sum::<f64>() / hours.len() as f64).round());
        Self {
            total_questions: total,
            answered_questions: answered,
            pending_questions: pending,
            response_rate,
            average_response_time,
        }
    }
}

/// Acknowledgement returned after deleting a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletedQuestion {
    pub id: QuestionId,
    pub deleted: bool,
}
