use crate::{
    handoff::{AnswerHandoff, HandoffKey, Owner},
    session::{error::Result, QuizSession},
};
use core::{
    fmt::{self, Display},
    future::Future,
};
use model::{attempt::NewScore, play::Submission, score::format_time};

#[derive(Debug, PartialEq, Eq)]
pub enum RecordError {
    /// Either the topic or the user no longer exists.
    NotFound,
    Server,
}

impl Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "topic or user not found",
            Self::Server => "attempt could not be persisted",
        })
    }
}

impl std::error::Error for RecordError {}

/// Durable sink for finished attempts. Implementors are bound to one authenticated identity.
pub trait AttemptRecorder {
    /// Persists one attempt and yields its identifier.
    fn record(&self, score: &NewScore) -> impl Future<Output = core::result::Result<i64, RecordError>> + Send;
}

/// Drives a session from `in_progress` through `saving` to `submitted`.
///
/// The answers are handed off for the result view before anything is recorded. Anonymous
/// players (no `recorder`) never reach the recorder. A failed save is logged and
/// otherwise ignored so that the player always reaches the result.
pub async fn submit<R, H>(session: &mut QuizSession, owner: Owner, recorder: Option<&R>, handoff: &H) -> Result<Submission>
where
    R: AttemptRecorder,
    H: AnswerHandoff + ?Sized,
{
    let score = session.begin_submit()?;
    let elapsed_seconds = session.elapsed().as_secs();
    handoff.store(HandoffKey::new(session.slug(), owner), session.answers().clone());

    let attempt_id = match recorder {
        Some(recorder) => {
            let new = NewScore {
                topic_slug: session.slug().into(),
                score: score.correct,
                total_questions: score.total,
                time_seconds: u32::try_from(elapsed_seconds).unwrap_or(u32::MAX),
            };
            match recorder.record(&new).await {
                Ok(id) => Some(id),
                Err(err) => {
                    log::warn!("failed to record attempt on `{}` for {owner}: {err}", session.slug());
                    None
                }
            }
        }
        None => None,
    };

    session.finish_submit()?;
    Ok(Submission {
        score,
        grade: score.grade(),
        elapsed_seconds,
        elapsed_time: format_time(elapsed_seconds),
        attempt_id,
    })
}
