use chrono::{DateTime, Utc};
use log::{debug, info};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    options::FindOptions,
    Database,
};
use rocket::{futures::TryStreamExt, http::Status};

use crate::error::{Error, Result};
use crate::model::{
    db::{Choice, NewChoice, NewQuestion, Question},
    mongodb::{Coll, Id},
};

use super::PollStore;

/// A store backed by the `questions` and `choices` collections of a MongoDB database.
pub struct MongoStore {
    questions: Coll<Question>,
    choices: Coll<Choice>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            questions: Coll::from_db(db),
            choices: Coll::from_db(db),
        }
    }
}

/// Matches questions whose publication date is not after `now`.
fn published_filter(now: DateTime<Utc>) -> Document {
    doc! {
        "published_at": { "$lte": BsonDateTime::from_chrono(now) },
    }
}

/// Matches a specific choice only if it belongs to the given question.
fn choice_of_question_filter(question_id: Id, choice_id: Id) -> Document {
    doc! {
        "_id": *choice_id,
        "question_id": *question_id,
    }
}

/// The relative update applied when votes are cast.
fn add_votes_update(delta: u32) -> Document {
    doc! {
        "$inc": { "votes": i64::from(delta) },
    }
}

#[rocket::async_trait]
impl PollStore for MongoStore {
    async fn list_recent(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Question>> {
        // A zero limit means "no limit" to MongoDB.
        if limit == 0 {
            return Ok(Vec::new());
        }
        let options = FindOptions::builder()
            .sort(doc! { "published_at": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();
        let questions = self
            .questions
            .find(published_filter(now), options)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(questions)
    }

    async fn get_by_id(&self, id: Id, now: DateTime<Utc>) -> Result<Option<Question>> {
        let mut filter = published_filter(now);
        filter.insert("_id", *id);
        Ok(self.questions.find_one(filter, None).await?)
    }

    async fn choices(&self, question_id: Id) -> Result<Vec<Choice>> {
        // Object IDs start with a timestamp, so sorting by them is creation order.
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let choices = self
            .choices
            .find(doc! { "question_id": *question_id }, options)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(choices)
    }

    async fn increment_votes(&self, question_id: Id, choice_id: Id, delta: u32) -> Result<bool> {
        let result = self
            .choices
            .update_one(
                choice_of_question_filter(question_id, choice_id),
                add_votes_update(delta),
                None,
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Id> {
        let id = self
            .questions
            .cast::<NewQuestion>()
            .insert_one(question, None)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    "Inserted question has a non-ObjectId key".to_string(),
                )
            })?;
        debug!("Inserted question {id}");
        Ok(id.into())
    }

    async fn insert_choice(&self, question_id: Id, text: String) -> Result<Id> {
        let exists = self
            .questions
            .count_documents(question_id.as_doc(), None)
            .await?
            > 0;
        if !exists {
            return Err(Error::not_found(format!("Question with ID '{question_id}'")));
        }

        let id = self
            .choices
            .cast::<NewChoice>()
            .insert_one(NewChoice::new(question_id, text), None)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    "Inserted choice has a non-ObjectId key".to_string(),
                )
            })?;
        debug!("Inserted choice {id} for question {question_id}");
        Ok(id.into())
    }

    async fn delete_question(&self, id: Id) -> Result<bool> {
        let deleted = self.questions.delete_one(id.as_doc(), None).await?;
        if deleted.deleted_count == 0 {
            return Ok(false);
        }
        let choices = self
            .choices
            .delete_many(doc! { "question_id": *id }, None)
            .await?;
        info!(
            "Deleted question {id} and {} choice(s)",
            choices.deleted_count
        );
        Ok(true)
    }
}
