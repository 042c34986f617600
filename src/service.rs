//! The operations the HTTP layer exposes, independent of HTTP.
//!
//! Every method takes the current time explicitly; only the route handlers
//! read the wall clock.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    db::{Choice, Question},
    mongodb::Id,
    store::Store,
    vote::{record_vote, VoteError},
};

/// How many questions the index shows.
pub const LATEST_QUESTIONS: usize = 5;

/// The message shown for any unusable vote submission.
pub const NO_CHOICE_SELECTED: &str = "no choice selected";

/// A question together with all of its choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionWithChoices {
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// What happened to a vote submission on a visible question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    InvalidSelection(String),
}

/// Poll queries and vote submission over a shared store.
#[derive(Clone)]
pub struct PollService {
    store: Store,
}

impl PollService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The latest published questions, newest first.
    pub async fn index(&self, now: DateTime<Utc>) -> Result<Vec<Question>> {
        self.store.list_recent(now, LATEST_QUESTIONS).await
    }

    /// A published question and its choices.
    pub async fn detail(&self, question_id: Id, now: DateTime<Utc>) -> Result<QuestionWithChoices> {
        let question = self
            .store
            .get_by_id(question_id, now)
            .await?
            .ok_or_else(|| Error::not_found(format!("Question with ID '{question_id}'")))?;
        let choices = self.store.choices(question_id).await?;
        Ok(QuestionWithChoices { question, choices })
    }

    /// Same lookup as [`PollService::detail`]; the caller presents the vote counts.
    pub async fn results(
        &self,
        question_id: Id,
        now: DateTime<Utc>,
    ) -> Result<QuestionWithChoices> {
        self.detail(question_id, now).await
    }

    /// Vote for `choice_id` on `question_id`.
    ///
    /// A missing or unpublished question is a `NotFound` error. Any problem
    /// with the selection itself collapses into a single
    /// [`VoteOutcome::InvalidSelection`].
    pub async fn vote(
        &self,
        question_id: Id,
        choice_id: Option<Id>,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome> {
        match record_vote(self.store.as_ref(), question_id, choice_id, now).await {
            Ok(()) => {
                info!("Vote recorded on question {question_id}");
                Ok(VoteOutcome::Recorded)
            }
            Err(VoteError::QuestionNotFound(id)) => {
                Err(Error::not_found(format!("Question with ID '{id}'")))
            }
            Err(err @ (VoteError::ChoiceNotSelected | VoteError::ChoiceNotFound { .. })) => {
                debug!("Rejected vote on question {question_id}: {err}");
                Ok(VoteOutcome::InvalidSelection(NO_CHOICE_SELECTED.to_string()))
            }
            Err(VoteError::Storage(err)) => Err(err),
        }
    }
}
