//! Recording votes against a question's choices.

use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

use crate::error::Error;
use crate::model::{mongodb::Id, store::PollStore};

/// Why a vote was not recorded.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Question with ID '{0}' not found")]
    QuestionNotFound(Id),
    #[error("No choice was selected")]
    ChoiceNotSelected,
    #[error("Choice with ID '{choice_id}' not found for question '{question_id}'")]
    ChoiceNotFound { question_id: Id, choice_id: Id },
    #[error(transparent)]
    Storage(#[from] Error),
}

/// Cast one vote for `choice_id` on `question_id`, as of `now`.
///
/// Questions that do not exist or are not yet published cannot be voted on.
/// On success the choice's count has been raised by exactly one through the
/// store's atomic increment; on failure nothing has been written.
pub async fn record_vote(
    store: &dyn PollStore,
    question_id: Id,
    choice_id: Option<Id>,
    now: DateTime<Utc>,
) -> Result<(), VoteError> {
    if store.get_by_id(question_id, now).await?.is_none() {
        return Err(VoteError::QuestionNotFound(question_id));
    }
    let choice_id = choice_id.ok_or(VoteError::ChoiceNotSelected)?;

    if !store.increment_votes(question_id, choice_id, 1).await? {
        return Err(VoteError::ChoiceNotFound {
            question_id,
            choice_id,
        });
    }
    debug!("Recorded vote for choice {choice_id} on question {question_id}");
    Ok(())
}
