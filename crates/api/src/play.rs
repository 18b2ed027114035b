use crate::{
    error::{Error, Result},
    lobby::Lobby,
    util::response::{self, Reply},
};
use content::ContentStore;
use hyper::StatusCode;
use model::play::PlayId;
use quiz::{AnswerHandoff, AttemptRecorder, Owner};
use serde::Deserialize;
use std::sync::Arc;

const GONE: Error = Error::NotFound("Play session not found");

/// Player input that keeps the session in progress.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Select(Box<str>),
    Check,
    Next,
    Prev,
    GoTo(usize),
}

#[derive(Deserialize)]
struct SelectBody {
    label: Box<str>,
}

#[derive(Deserialize)]
struct GoToBody {
    index: usize,
}

impl Action {
    /// Builds the action named by the last path segment. Only `select` and `goto` read the body.
    pub fn parse(name: &str, body: &[u8]) -> Result<Self> {
        const MALFORMED: Error = Error::BadRequest("Malformed request body");
        Ok(match name {
            "select" => {
                let SelectBody { label } = serde_json::from_slice(body).map_err(|_| MALFORMED)?;
                Self::Select(label)
            }
            "goto" => {
                let GoToBody { index } = serde_json::from_slice(body).map_err(|_| MALFORMED)?;
                Self::GoTo(index)
            }
            "check" => Self::Check,
            "next" => Self::Next,
            "prev" => Self::Prev,
            _ => return Err(Error::NotFound("Not found")),
        })
    }

    pub fn reads_body(name: &str) -> bool {
        matches!(name, "select" | "goto")
    }
}

pub fn start(content: &ContentStore, lobby: &Lobby, slug: &str) -> Result<Reply> {
    let quiz = content.quiz(slug).ok_or(Error::NotFound("Quiz not found"))?;
    let id = lobby.open(slug, Arc::clone(quiz));
    log::debug!("Play session {id} started on `{slug}`.");
    lobby.with(id, |session| response::json(StatusCode::CREATED, &session.view(id))).ok_or(GONE)?
}

pub fn view(lobby: &Lobby, id: PlayId) -> Result<Reply> {
    lobby.with(id, |session| response::json(StatusCode::OK, &session.view(id))).ok_or(GONE)?
}

pub fn act(lobby: &Lobby, id: PlayId, action: Action) -> Result<Reply> {
    lobby
        .with(id, |session| {
            match action {
                Action::Select(label) => {
                    session.select(&label)?;
                }
                Action::Check => {
                    session.check()?;
                }
                Action::Next => {
                    session.next()?;
                }
                Action::Prev => {
                    session.prev()?;
                }
                Action::GoTo(index) => {
                    session.go_to(index)?;
                }
            }
            response::json(StatusCode::OK, &session.view(id))
        })
        .ok_or(GONE)?
}

/// Grades the session and removes it from the lobby. A refused submission leaves it seated.
pub async fn submit<R, H>(lobby: &Lobby, handoff: &H, id: PlayId, user: Option<i32>, recorder: Option<&R>) -> Result<Reply>
where
    R: AttemptRecorder,
    H: AnswerHandoff,
{
    let mut session = lobby.take(id).ok_or(GONE)?;
    let owner = user.map_or(Owner::Play(id), Owner::User);
    match quiz::submit(&mut session, owner, recorder, handoff).await {
        Ok(submission) => {
            log::debug!("Play session {id} submitted with {}%.", submission.score.percentage);
            response::json(StatusCode::OK, &submission)
        }
        Err(err) => {
            lobby.restore(id, session);
            Err(err.into())
        }
    }
}

pub fn abandon(lobby: &Lobby, id: PlayId) -> Result<Reply> {
    if !lobby.abandon(id) {
        return Err(GONE);
    }
    Ok(response::empty(StatusCode::NO_CONTENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handoff::MemoryHandoff, lobby::tests::bank, score::DbRecorder};
    use http_body_util::BodyExt;
    use quiz::HandoffKey;
    use serde_json::Value;
    use std::time::Duration;

    fn store() -> ContentStore {
        let quiz = (*bank(2)).clone();
        ContentStore::from_documents(Vec::new(), [(Box::<str>::from("iot"), quiz)]).unwrap()
    }

    async fn body(reply: Reply) -> Value {
        let bytes = reply.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn play_id(value: &Value) -> PlayId {
        value["playId"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unknown_quiz_is_not_found() {
        let lobby = Lobby::default();
        assert_eq!(start(&store(), &lobby, "unknown-slug").unwrap_err(), Error::NotFound("Quiz not found"));
        assert!(lobby.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn anonymous_play_through() {
        let content = store();
        let lobby = Lobby::default();
        let handoff = MemoryHandoff::new(Duration::from_secs(60));

        let reply = start(&content, &lobby, "iot").unwrap();
        assert_eq!(reply.status(), StatusCode::CREATED);
        let json = body(reply).await;
        assert_eq!(json["phase"], "in_progress");
        assert_eq!(json["total"], 2);
        assert!(json["question"].get("correctAnswer").is_none());
        let id = play_id(&json);

        let json = body(act(&lobby, id, Action::Select("A".into())).unwrap()).await;
        assert_eq!(json["selected"], "A");
        assert!(json["feedback"].is_null());

        let json = body(act(&lobby, id, Action::Check).unwrap()).await;
        assert_eq!(json["feedback"]["isCorrect"], true);

        let err = act(&lobby, id, Action::GoTo(5)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = submit::<DbRecorder, _>(&lobby, &handoff, id, None, None).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(lobby.len(), 1);

        act(&lobby, id, Action::Next).unwrap();
        act(&lobby, id, Action::Select("B".into())).unwrap();
        let reply = submit::<DbRecorder, _>(&lobby, &handoff, id, None, None).await.unwrap();
        let json = body(reply).await;
        assert_eq!(json["score"]["correct"], 1);
        assert_eq!(json["score"]["percentage"], 50);
        assert_eq!(json["grade"], "D");
        assert_eq!(json["elapsedTime"], "0:00");
        assert!(json["attemptId"].is_null());

        assert!(lobby.is_empty());
        assert_eq!(view(&lobby, id).unwrap_err(), GONE);
        assert!(handoff.load(&HandoffKey::new("iot", Owner::Play(id))).is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn abandoning_destroys_the_session() {
        let lobby = Lobby::default();
        let json = body(start(&store(), &lobby, "iot").unwrap()).await;
        let id = play_id(&json);
        assert_eq!(abandon(&lobby, id).unwrap().status(), StatusCode::NO_CONTENT);
        assert_eq!(abandon(&lobby, id).unwrap_err(), GONE);
    }

    #[test]
    fn parses_actions() {
        assert_eq!(Action::parse("select", br#"{"label":"C"}"#).unwrap(), Action::Select("C".into()));
        assert_eq!(Action::parse("goto", br#"{"index":3}"#).unwrap(), Action::GoTo(3));
        assert_eq!(Action::parse("next", b"").unwrap(), Action::Next);
        assert!(matches!(Action::parse("select", b"{}"), Err(Error::BadRequest(_))));
        assert!(matches!(Action::parse("jump", b""), Err(Error::NotFound(_))));
    }
}
