//! Question and choice persistence.
//!
//! Everything above this module talks to a [`PollStore`]; the concrete
//! store is picked at ignition from the `storage` config key.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    db::{Choice, NewQuestion, Question},
    mongodb::Id,
};

mod memory;
mod mongo;

#[cfg(test)]
mod behaviour;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A shared handle on whichever store the server was configured with.
pub type Store = Arc<dyn PollStore>;

/// Storage of questions and their choices.
///
/// Reads never mutate anything. The only mutation on the voting path is
/// [`PollStore::increment_votes`], which each implementation must apply as
/// a single atomic relative update.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    /// Questions published at or before `now`, newest first, at most `limit` of them.
    async fn list_recent(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Question>>;

    /// The question with the given ID, unless it does not exist or is not yet published.
    async fn get_by_id(&self, id: Id, now: DateTime<Utc>) -> Result<Option<Question>>;

    /// The choices belonging to a question, in creation order.
    async fn choices(&self, question_id: Id) -> Result<Vec<Choice>>;

    /// Add `delta` to the votes of `choice_id`, provided it belongs to `question_id`.
    ///
    /// Returns `false` if no such choice exists on that question.
    async fn increment_votes(&self, question_id: Id, choice_id: Id, delta: u32) -> Result<bool>;

    /// Insert a new question, returning its ID.
    async fn insert_question(&self, question: NewQuestion) -> Result<Id>;

    /// Insert a new choice with no votes on an existing question, returning its ID.
    async fn insert_choice(&self, question_id: Id, text: String) -> Result<Id>;

    /// Delete a question along with all of its choices.
    ///
    /// Returns `false` if there was no such question.
    async fn delete_question(&self, id: Id) -> Result<bool>;
}
