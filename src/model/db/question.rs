use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{mongodb::Id, recency::was_recently_published};

/// Core question data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCore {
    /// The poll prompt.
    pub text: String,
    /// When the question becomes visible. Never changes after creation.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub published_at: DateTime<Utc>,
}

impl QuestionCore {
    pub fn new(text: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            published_at,
        }
    }

    /// Is this question published as of `now`?
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.published_at <= now
    }

    /// Was this question published within the last day, as of `now`?
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        was_recently_published(self.published_at, now)
    }
}

/// A new [`Question`] ready for DB insertion is just a [`Question`] without an ID.
pub type NewQuestion = QuestionCore;

/// A question from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub question: QuestionCore,
}

impl Deref for Question {
    type Target = QuestionCore;

    fn deref(&self) -> &Self::Target {
        &self.question
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use mongodb::bson::{self, Bson};

    impl NewQuestion {
        /// A question published `days` days from now (negative for the past).
        pub fn example(text: &str, days: i64) -> Self {
            Self::new(text, Utc::now() + Duration::days(days))
        }
    }

    #[test]
    fn publication_is_inclusive_of_now() {
        let now = Utc::now();
        let question = NewQuestion::new("What's new?", now);
        assert!(question.is_published(now));
        assert!(question.was_published_recently(now));
        assert!(!question.is_published(now - Duration::seconds(1)));
    }

    #[test]
    fn stored_as_bson_datetime() {
        let question = Question {
            id: Id::new(),
            question: NewQuestion::example("What's up?", -1),
        };
        let doc = bson::to_document(&question).unwrap();
        assert!(matches!(doc.get("published_at"), Some(Bson::DateTime(_))));
        assert!(matches!(doc.get("_id"), Some(Bson::ObjectId(_))));
        assert_eq!(doc.get_str("text").unwrap(), "What's up?");
    }
}
