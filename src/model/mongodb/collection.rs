use std::ops::Deref;

use log::debug;
use mongodb::{bson::doc, error::Error as DbError, Collection, Database, IndexModel};

use crate::model::db::{
    choice::{Choice, NewChoice},
    question::{NewQuestion, Question},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }

    /// Get a handle on the same collection, viewed as a different type.
    pub fn cast<U: MongoCollection>(&self) -> Coll<U> {
        Coll(self.0.clone_with_type())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Question collections
const QUESTIONS: &str = "questions";
impl MongoCollection for Question {
    const NAME: &'static str = QUESTIONS;
}
impl MongoCollection for NewQuestion {
    const NAME: &'static str = QUESTIONS;
}

// Choice collections
const CHOICES: &str = "choices";
impl MongoCollection for Choice {
    const NAME: &'static str = CHOICES;
}
impl MongoCollection for NewChoice {
    const NAME: &'static str = CHOICES;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Question collection: the index listing sorts by publication date.
    let question_index = IndexModel::builder()
        .keys(doc! {"published_at": -1})
        .build();
    Coll::<Question>::from_db(db)
        .create_index(question_index, None)
        .await?;

    // Choice collection: choices are always looked up through their question.
    let choice_index = IndexModel::builder()
        .keys(doc! {"question_id": 1, "_id": 1})
        .build();
    Coll::<Choice>::from_db(db)
        .create_index(choice_index, None)
        .await?;

    Ok(())
}
