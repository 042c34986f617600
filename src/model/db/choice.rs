use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core choice data, linked to the question that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCore {
    /// The owning question.
    pub question_id: Id,
    /// The answer text.
    pub text: String,
    /// Number of votes received. Starts at zero and only ever goes up.
    pub votes: u64,
}

impl ChoiceCore {
    /// Create a new choice with no votes.
    pub fn new(question_id: Id, text: impl Into<String>) -> Self {
        Self {
            question_id,
            text: text.into(),
            votes: 0,
        }
    }
}

/// A new [`Choice`] ready for DB insertion is just a [`Choice`] without an ID.
pub type NewChoice = ChoiceCore;

/// A choice from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub choice: ChoiceCore,
}

impl Deref for Choice {
    type Target = ChoiceCore;

    fn deref(&self) -> &Self::Target {
        &self.choice
    }
}
