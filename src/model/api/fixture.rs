use chrono::{DateTime, Duration, Utc};
use log::info;
use rocket::serde::json::serde_json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{db::NewQuestion, store::PollStore};

/// A question to seed the store with, as written in a fixture file.
///
/// The publication date is either absolute (`published_at`) or relative to
/// load time (`days_from_now`, negative for the past). Neither means "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub text: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days_from_now: Option<i64>,
    #[serde(default)]
    pub choices: Vec<String>,
}

impl QuestionSpec {
    /// Resolve the publication date relative to `now`.
    pub fn published_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match (self.published_at, self.days_from_now) {
            (Some(_), Some(_)) => Err(Error::Fixture(format!(
                "question '{}' sets both `published_at` and `days_from_now`",
                self.text
            ))),
            (Some(published_at), None) => Ok(published_at),
            (None, Some(days)) => Ok(now + Duration::days(days)),
            (None, None) => Ok(now),
        }
    }
}

/// Parse a fixture document: a JSON array of [`QuestionSpec`]s.
pub fn parse_fixtures(json: &str) -> Result<Vec<QuestionSpec>> {
    serde_json::from_str(json).map_err(|e| Error::Fixture(e.to_string()))
}

/// Insert every fixture question and its choices into the store.
///
/// Returns the number of questions inserted.
pub async fn load_fixtures(
    store: &dyn PollStore,
    specs: Vec<QuestionSpec>,
    now: DateTime<Utc>,
) -> Result<usize> {
    // Validate everything up front so a bad entry doesn't leave a partial load.
    let resolved = specs
        .into_iter()
        .map(|spec| -> Result<_> { Ok((spec.published_at(now)?, spec)) })
        .collect::<Result<Vec<_>>>()?;

    let count = resolved.len();
    for (published_at, spec) in resolved {
        let question_id = store
            .insert_question(NewQuestion::new(spec.text, published_at))
            .await?;
        for choice in spec.choices {
            store.insert_choice(question_id, choice).await?;
        }
    }
    info!("Loaded {count} fixture question(s)");
    Ok(count)
}

/// Read and load a fixture file.
pub async fn load_fixture_file(
    store: &dyn PollStore,
    path: &str,
    now: DateTime<Utc>,
) -> Result<usize> {
    let json = rocket::tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Fixture(format!("cannot read '{path}': {e}")))?;
    load_fixtures(store, parse_fixtures(&json)?, now).await
}
