use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    db::{Choice, Question},
};
use crate::service::QuestionWithChoices;

/// A question as listed on the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    /// Question unique ID.
    pub id: ApiId,
    /// Question text.
    pub text: String,
    /// When the question was published.
    pub published_at: DateTime<Utc>,
    /// Whether the question went up within the last day.
    pub was_published_recently: bool,
}

impl QuestionSummary {
    pub fn new(question: Question, now: DateTime<Utc>) -> Self {
        Self {
            id: question.id.into(),
            was_published_recently: question.was_published_recently(now),
            text: question.question.text,
            published_at: question.question.published_at,
        }
    }
}

/// A choice as offered for voting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDesc {
    pub id: ApiId,
    pub text: String,
}

impl From<Choice> for ChoiceDesc {
    fn from(choice: Choice) -> Self {
        Self {
            id: choice.id.into(),
            text: choice.choice.text,
        }
    }
}

/// A question with the choices that can be voted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub id: ApiId,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub choices: Vec<ChoiceDesc>,
    /// Set when this detail is returned in response to an unusable vote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl QuestionDetail {
    /// Attach an error message explaining why a vote was not recorded.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

impl From<QuestionWithChoices> for QuestionDetail {
    fn from(QuestionWithChoices { question, choices }: QuestionWithChoices) -> Self {
        Self {
            id: question.id.into(),
            text: question.question.text,
            published_at: question.question.published_at,
            choices: choices.into_iter().map(ChoiceDesc::from).collect(),
            error_message: None,
        }
    }
}

/// A choice with its current vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResult {
    pub id: ApiId,
    pub text: String,
    pub votes: u64,
}

impl From<Choice> for ChoiceResult {
    fn from(choice: Choice) -> Self {
        Self {
            id: choice.id.into(),
            votes: choice.votes,
            text: choice.choice.text,
        }
    }
}

/// A question with the votes each choice has received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResults {
    pub id: ApiId,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub choices: Vec<ChoiceResult>,
}

impl From<QuestionWithChoices> for QuestionResults {
    fn from(QuestionWithChoices { question, choices }: QuestionWithChoices) -> Self {
        Self {
            id: question.id.into(),
            text: question.question.text,
            published_at: question.question.published_at,
            choices: choices.into_iter().map(ChoiceResult::from).collect(),
        }
    }
}
