use crate::{
    error::{Error, Result},
    util::response::{self, Reply},
};
use db::{Database, TryStreamExt};
use hyper::StatusCode;
use model::{
    attempt::{Attempt, NewScore},
    user::User,
    Stats,
};
use quiz::{AttemptRecorder, RecordError};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Saved {
    message: &'static str,
    attempt_id: i64,
}

#[derive(Serialize)]
struct Attempts {
    attempts: Vec<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Stats>,
}

impl Attempts {
    /// The unscoped history also carries the profile totals.
    fn new(attempts: Vec<Attempt>, scoped: bool) -> Self {
        let stats = (!scoped).then(|| Stats::tally(attempts.iter().map(|attempt| (attempt.score, attempt.total_questions))));
        Self { attempts, stats }
    }
}

/// Records attempts on behalf of one signed-in user.
pub struct DbRecorder<'a> {
    db: &'a Database,
    user: i32,
}

impl<'a> DbRecorder<'a> {
    pub const fn new(db: &'a Database, user: i32) -> Self {
        Self { db, user }
    }
}

impl AttemptRecorder for DbRecorder<'_> {
    async fn record(&self, score: &NewScore) -> core::result::Result<i64, RecordError> {
        self.db
            .create_attempt(self.user, &score.topic_slug, score.score, score.total_questions, score.time_seconds)
            .await
            .map_err(|err| match err {
                db::error::Error::NotFound => RecordError::NotFound,
                _ => RecordError::Server,
            })
    }
}

pub fn validate(score: &NewScore) -> Result<()> {
    if score.score > score.total_questions {
        return Err(Error::Validation("Score cannot exceed the number of questions"));
    }
    Ok(())
}

pub async fn save(db: &Database, user: Option<&User>, body: &[u8]) -> Result<Reply> {
    let user = user.ok_or(Error::Unauthorized("Unauthorized"))?;
    let score: NewScore = serde_json::from_slice(body).map_err(|_| Error::BadRequest("Malformed request body"))?;
    validate(&score)?;

    let attempt_id = DbRecorder::new(db, user.id).record(&score).await.map_err(|err| match err {
        RecordError::NotFound => Error::NotFound("Topic not found"),
        RecordError::Server => Error::Persistence("Failed to save score"),
    })?;

    log::info!("Saved attempt {attempt_id} on `{}` for user {}.", score.topic_slug, user.id);
    response::json(StatusCode::CREATED, &Saved { message: "Score saved", attempt_id })
}

/// Most recent attempts first. Scoped to one topic when `slug` is given, otherwise
/// accompanied by the totals over the returned attempts.
pub async fn history(db: &Database, user: Option<&User>, slug: Option<&str>) -> Result<Reply> {
    let user = user.ok_or(Error::Unauthorized("Unauthorized"))?;
    let attempts: Vec<Attempt> = match slug {
        Some(slug) => db.get_attempts_for_topic(user.id, slug).await.map_err(fetch_failed)?.try_collect().await,
        None => db.get_attempts(user.id).await.map_err(fetch_failed)?.try_collect().await,
    }
    .map_err(fetch_failed)?;
    response::json(StatusCode::OK, &Attempts::new(attempts, slug.is_some()))
}

fn fetch_failed(err: db::error::Error) -> Error {
    log::error!("cannot fetch attempts: {err}");
    Error::Persistence("Failed to fetch scores")
}
