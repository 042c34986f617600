//! Checks every [`PollStore`] must pass, run against each implementation.

use chrono::{DateTime, Duration, Utc};

use super::{PollStore, Store};
use crate::error::Error;
use crate::model::{db::NewQuestion, mongodb::Id};

async fn question(store: &dyn PollStore, text: &str, published_at: DateTime<Utc>) -> Id {
    store
        .insert_question(NewQuestion::new(text, published_at))
        .await
        .unwrap()
}

pub async fn list_recent_orders_filters_and_truncates(store: &dyn PollStore) {
    let now = Utc::now();
    for days in 1..=7 {
        question(store, &format!("Question {days}"), now - Duration::days(days)).await;
    }
    question(store, "Future question", now + Duration::days(1)).await;

    let listed = store.list_recent(now, 5).await.unwrap();
    let texts = listed.iter().map(|q| q.text.as_str()).collect::<Vec<_>>();
    assert_eq!(
        texts,
        vec!["Question 1", "Question 2", "Question 3", "Question 4", "Question 5"]
    );

    let listed = store.list_recent(now, 10).await.unwrap();
    assert_eq!(listed.len(), 7);
    assert!(listed.iter().all(|q| q.text != "Future question"));
}

pub async fn zero_limit_lists_nothing(store: &dyn PollStore) {
    let now = Utc::now();
    question(store, "Past question", now - Duration::days(1)).await;

    assert!(store.list_recent(now, 0).await.unwrap().is_empty());
    assert_eq!(store.list_recent(now, 1).await.unwrap().len(), 1);
}

pub async fn get_by_id_hides_future_questions(store: &dyn PollStore) {
    let now = Utc::now();
    let future = question(store, "Future question", now + Duration::days(5)).await;
    let past = question(store, "Past question", now - Duration::days(5)).await;

    assert!(store.get_by_id(future, now).await.unwrap().is_none());
    assert!(store.get_by_id(Id::new(), now).await.unwrap().is_none());
    let found = store.get_by_id(past, now).await.unwrap().unwrap();
    assert_eq!(found.id, past);
    assert_eq!(found.text, "Past question");
    assert!(store
        .get_by_id(future, now + Duration::days(6))
        .await
        .unwrap()
        .is_some());
}

pub async fn increment_requires_matching_question(store: &dyn PollStore) {
    let now = Utc::now();
    let q1 = question(store, "First", now).await;
    let q2 = question(store, "Second", now).await;
    let yes = store.insert_choice(q1, "Yes".to_string()).await.unwrap();
    let no = store.insert_choice(q1, "No".to_string()).await.unwrap();

    assert!(!store.increment_votes(q2, yes, 1).await.unwrap());
    assert!(!store.increment_votes(q1, Id::new(), 1).await.unwrap());
    assert!(store.increment_votes(q1, yes, 1).await.unwrap());
    assert!(store.increment_votes(q1, yes, 2).await.unwrap());

    let votes = store
        .choices(q1)
        .await
        .unwrap()
        .iter()
        .map(|c| (c.id, c.text.clone(), c.votes))
        .collect::<Vec<_>>();
    assert_eq!(
        votes,
        vec![(yes, "Yes".to_string(), 3), (no, "No".to_string(), 0)]
    );
    assert!(store.choices(q2).await.unwrap().is_empty());
}

pub async fn insert_choice_on_missing_question_fails(store: &dyn PollStore) {
    let result = store.insert_choice(Id::new(), "Orphan".to_string()).await;
    assert!(matches!(result, Err(Error::Status(status, _)) if status.code == 404));
}

pub async fn delete_cascades_to_choices(store: &dyn PollStore) {
    let now = Utc::now();
    let doomed = question(store, "Doomed", now).await;
    let kept = question(store, "Kept", now).await;
    store.insert_choice(doomed, "A".to_string()).await.unwrap();
    store.insert_choice(doomed, "B".to_string()).await.unwrap();
    store.insert_choice(kept, "C".to_string()).await.unwrap();

    assert!(store.delete_question(doomed).await.unwrap());
    assert!(!store.delete_question(doomed).await.unwrap());
    assert!(store.get_by_id(doomed, now).await.unwrap().is_none());
    assert!(store.choices(doomed).await.unwrap().is_empty());
    assert_eq!(store.choices(kept).await.unwrap().len(), 1);
}

pub async fn concurrent_increments_are_not_lost(store: Store) {
    const VOTES: u64 = 100;

    let q = question(store.as_ref(), "Popular", Utc::now()).await;
    let choice = store.insert_choice(q, "Yes".to_string()).await.unwrap();

    let handles = (0..VOTES)
        .map(|_| {
            let store = store.clone();
            rocket::tokio::spawn(async move { store.increment_votes(q, choice, 1).await })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    assert_eq!(store.choices(q).await.unwrap()[0].votes, VOTES);
}
