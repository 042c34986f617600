use chrono::Utc;
use rocket::{
    form::Form,
    response::Redirect,
    serde::json::Json,
    Route, State,
};

use crate::error::Result;
use crate::model::{
    api::question::{QuestionDetail, QuestionResults, QuestionSummary},
    mongodb::Id,
};
use crate::service::{PollService, VoteOutcome};

pub fn routes() -> Vec<Route> {
    routes![index, detail, results, vote]
}

#[get("/polls")]
async fn index(polls: &State<PollService>) -> Result<Json<Vec<QuestionSummary>>> {
    let now = Utc::now();
    let questions = polls
        .index(now)
        .await?
        .into_iter()
        .map(|question| QuestionSummary::new(question, now))
        .collect();
    Ok(Json(questions))
}

#[get("/polls/<question_id>")]
async fn detail(question_id: Id, polls: &State<PollService>) -> Result<Json<QuestionDetail>> {
    let question = polls.detail(question_id, Utc::now()).await?;
    Ok(Json(question.into()))
}

#[get("/polls/<question_id>/results")]
async fn results(question_id: Id, polls: &State<PollService>) -> Result<Json<QuestionResults>> {
    let question = polls.results(question_id, Utc::now()).await?;
    Ok(Json(question.into()))
}

/// A vote submission. An absent or unparseable `choice` is treated as no selection.
#[derive(Debug, FromForm)]
struct VoteForm {
    choice: Option<Id>,
}

#[derive(Responder)]
enum VoteResponse {
    Recorded(Redirect),
    Rejected(Json<QuestionDetail>),
}

#[post("/polls/<question_id>/vote", data = "<form>")]
async fn vote(
    question_id: Id,
    form: Option<Form<VoteForm>>,
    polls: &State<PollService>,
) -> Result<VoteResponse> {
    let now = Utc::now();
    let choice = form.and_then(|form| form.into_inner().choice);

    match polls.vote(question_id, choice, now).await? {
        VoteOutcome::Recorded => Ok(VoteResponse::Recorded(Redirect::to(uri!(results(
            question_id
        ))))),
        VoteOutcome::InvalidSelection(message) => {
            let question = polls.detail(question_id, now).await?;
            Ok(VoteResponse::Rejected(Json(
                QuestionDetail::from(question).with_error(message),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;

    use super::*;
    use crate::model::{db::NewQuestion, store::Store};
    use crate::service::{LATEST_QUESTIONS, NO_CHOICE_SELECTED};

    async fn create_question(store: &Store, text: &str, days: i64, choices: &[&str]) -> Id {
        let id = store
            .insert_question(NewQuestion::example(text, days))
            .await
            .unwrap();
        for choice in choices {
            store.insert_choice(id, choice.to_string()).await.unwrap();
        }
        id
    }

    async fn get_index(client: &Client) -> Vec<QuestionSummary> {
        let response = client.get(uri!(index)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        response.into_json::<Vec<QuestionSummary>>().await.unwrap()
    }

    #[backend_test]
    async fn no_questions(client: Client) {
        assert!(get_index(&client).await.is_empty());
    }

    #[backend_test]
    async fn past_question(client: Client, store: Store) {
        let id = create_question(&store, "Past question", -30, &[]).await;

        let index = get_index(&client).await;
        assert_eq!(index.len(), 1);
        assert_eq!(*index[0].id, id);
        assert_eq!(index[0].text, "Past question");
        assert!(!index[0].was_published_recently);
    }

    #[backend_test]
    async fn future_question(client: Client, store: Store) {
        create_question(&store, "Future question", 30, &[]).await;

        assert!(get_index(&client).await.is_empty());
    }

    #[backend_test]
    async fn future_and_past_question(client: Client, store: Store) {
        let past = create_question(&store, "Past question", -30, &[]).await;
        create_question(&store, "Future question", 30, &[]).await;

        let ids = get_index(&client)
            .await
            .into_iter()
            .map(|q| *q.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![past]);
    }

    #[backend_test]
    async fn two_past_questions(client: Client, store: Store) {
        let q1 = create_question(&store, "Past question 1", -30, &[]).await;
        let q2 = create_question(&store, "Past question 2", -5, &[]).await;

        let ids = get_index(&client)
            .await
            .into_iter()
            .map(|q| *q.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![q2, q1]);
    }

    #[backend_test]
    async fn index_is_capped(client: Client, store: Store) {
        for days in 1..=8 {
            create_question(&store, "Old question", -days, &[]).await;
        }

        assert_eq!(get_index(&client).await.len(), LATEST_QUESTIONS);
    }

    #[backend_test]
    async fn detail_future_question(client: Client, store: Store) {
        let id = create_question(&store, "Future question", 5, &["A"]).await;

        let response = client.get(uri!(detail(id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.get(uri!(results(id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn detail_past_question(client: Client, store: Store) {
        let id = create_question(&store, "Past question", -5, &["Yes", "No"]).await;

        let response = client.get(uri!(detail(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let detail = response.into_json::<QuestionDetail>().await.unwrap();
        assert_eq!(detail.text, "Past question");
        let choices = detail.choices.iter().map(|c| c.text.as_str()).collect::<Vec<_>>();
        assert_eq!(choices, vec!["Yes", "No"]);
        assert!(detail.error_message.is_none());
    }

    #[backend_test]
    async fn detail_bad_ids(client: Client) {
        let response = client.get(uri!(detail(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.get("/polls/not-an-id").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn vote_redirects_to_results(client: Client, store: Store) {
        let id = create_question(&store, "Past question", -1, &["Yes", "No"]).await;
        let choices = store.choices(id).await.unwrap();
        let no = choices[1].id;

        let response = client
            .post(uri!(vote(id)))
            .header(ContentType::Form)
            .body(format!("choice={no}"))
            .dispatch()
            .await;
        assert_eq!(Status::SeeOther, response.status());
        assert_eq!(
            response.headers().get_one("Location"),
            Some(uri!(results(id)).to_string().as_str())
        );

        let response = client.get(uri!(results(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let results = response.into_json::<QuestionResults>().await.unwrap();
        let votes = results
            .choices
            .iter()
            .map(|c| (c.text.as_str(), c.votes))
            .collect::<Vec<_>>();
        assert_eq!(votes, vec![("Yes", 0), ("No", 1)]);
    }

    #[backend_test]
    async fn vote_without_choice(client: Client, store: Store) {
        let id = create_question(&store, "Past question", -1, &["Yes"]).await;

        let unknown = format!("choice={}", Id::new());
        for body in ["", "choice=", "choice=garbage", unknown.as_str()] {
            let response = client
                .post(uri!(vote(id)))
                .header(ContentType::Form)
                .body(body)
                .dispatch()
                .await;
            assert_eq!(Status::Ok, response.status(), "body {body:?}");

            let detail = response.into_json::<QuestionDetail>().await.unwrap();
            assert_eq!(detail.error_message.as_deref(), Some(NO_CHOICE_SELECTED));
            assert_eq!(detail.choices.len(), 1);
        }

        let choices = store.choices(id).await.unwrap();
        assert_eq!(choices[0].votes, 0);
    }

    #[backend_test]
    async fn vote_without_form_body(client: Client, store: Store) {
        let id = create_question(&store, "Past question", -1, &["Yes"]).await;

        let response = client
            .post(uri!(vote(id)))
            .header(Header::new("Content-Type", "text/plain"))
            .body("Yes")
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let detail = response.into_json::<QuestionDetail>().await.unwrap();
        assert_eq!(detail.error_message.as_deref(), Some(NO_CHOICE_SELECTED));
    }

    #[backend_test]
    async fn vote_on_future_question(client: Client, store: Store) {
        let id = create_question(&store, "Future question", 3, &["Yes"]).await;
        let choice = store.choices(id).await.unwrap()[0].id;

        let response = client
            .post(uri!(vote(id)))
            .header(ContentType::Form)
            .body(format!("choice={choice}"))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let question = store
            .get_by_id(id, Utc::now() + Duration::days(4))
            .await
            .unwrap();
        assert!(question.is_some());
        assert_eq!(store.choices(id).await.unwrap()[0].votes, 0);
    }
}
