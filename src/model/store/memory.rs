use chrono::{DateTime, Utc};
use log::debug;
use rocket::tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{
    db::{Choice, ChoiceCore, NewQuestion, Question},
    mongodb::Id,
};

use super::PollStore;

#[derive(Debug, Default)]
struct Tables {
    questions: Vec<Question>,
    choices: Vec<Choice>,
}

/// An in-process store, used when no database is configured and in tests.
///
/// Vote increments are applied while holding the write lock, so they are
/// atomic with respect to every other store operation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn list_recent(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Question>> {
        let tables = self.tables.read().await;
        let mut published = tables
            .questions
            .iter()
            .filter(|q| q.is_published(now))
            .cloned()
            .collect::<Vec<_>>();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        published.truncate(limit);
        Ok(published)
    }

    async fn get_by_id(&self, id: Id, now: DateTime<Utc>) -> Result<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .find(|q| q.id == id && q.is_published(now))
            .cloned())
    }

    async fn choices(&self, question_id: Id) -> Result<Vec<Choice>> {
        let tables = self.tables.read().await;
        Ok(tables
            .choices
            .iter()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn increment_votes(&self, question_id: Id, choice_id: Id, delta: u32) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .choices
            .iter_mut()
            .find(|c| c.id == choice_id && c.question_id == question_id)
        {
            Some(choice) => {
                choice.choice.votes += u64::from(delta);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Id> {
        let id = Id::new();
        self.tables
            .write()
            .await
            .questions
            .push(Question { id, question });
        debug!("Inserted question {id}");
        Ok(id)
    }

    async fn insert_choice(&self, question_id: Id, text: String) -> Result<Id> {
        let mut tables = self.tables.write().await;
        if !tables.questions.iter().any(|q| q.id == question_id) {
            return Err(Error::not_found(format!("Question with ID '{question_id}'")));
        }
        let id = Id::new();
        tables.choices.push(Choice {
            id,
            choice: ChoiceCore::new(question_id, text),
        });
        debug!("Inserted choice {id} for question {question_id}");
        Ok(id)
    }

    async fn delete_question(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        if tables.questions.len() == before {
            return Ok(false);
        }
        tables.choices.retain(|c| c.question_id != id);
        debug!("Deleted question {id} and its choices");
        Ok(true)
    }
}
