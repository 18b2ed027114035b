pub mod auth;
pub mod error;
pub mod handoff;
pub mod lobby;
pub mod play;
pub mod result;
pub mod score;
pub mod topics;

mod util {
    pub mod response;
    pub mod session;
}

pub use util::response::Reply;

use content::ContentStore;
use db::Database;
use error::{Error, Result};
use handoff::MemoryHandoff;
use http_body_util::BodyExt;
use hyper::{
    body::{Body, Bytes},
    http::request::Parts,
    HeaderMap, Method, Request, StatusCode,
};
use lobby::Lobby;
use model::{play::PlayId, user::User};
use std::time::Duration;

/// Endpoint resolved from the method and path of a request.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Topics,
    Topic(&'a str),
    Summary(&'a str),
    Quiz(&'a str),
    Register,
    Login,
    Logout,
    SaveScore,
    ScoreHistory,
    StartPlay(&'a str),
    ViewPlay(PlayId),
    PlayAction(PlayId, &'a str),
    SubmitPlay(PlayId),
    AbandonPlay(PlayId),
    Result(&'a str),
}

fn play_id(text: &str) -> Result<PlayId> {
    text.parse().map_err(|_| Error::NotFound("Play session not found"))
}

impl<'a> Route<'a> {
    pub fn resolve(method: &Method, path: &'a str) -> Result<Self> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let parts = [segments.next(), segments.next(), segments.next()];
        if segments.next().is_some() {
            return Err(Error::NotFound("Not found"));
        }

        let route = match (method, parts) {
            (&Method::GET, [Some("topics"), None, None]) => Self::Topics,
            (&Method::GET, [Some("topics"), Some(slug), None]) => Self::Topic(slug),
            (&Method::GET, [Some("summaries"), Some(slug), None]) => Self::Summary(slug),
            (&Method::GET, [Some("quiz"), Some(slug), None]) => Self::Quiz(slug),
            (&Method::POST, [Some("register"), None, None]) => Self::Register,
            (&Method::POST, [Some("login"), None, None]) => Self::Login,
            (&Method::POST, [Some("logout"), None, None]) => Self::Logout,
            (&Method::POST, [Some("score"), None, None]) => Self::SaveScore,
            (&Method::GET, [Some("score"), None, None]) => Self::ScoreHistory,
            (&Method::POST, [Some("play"), Some(slug), None]) => Self::StartPlay(slug),
            (&Method::GET, [Some("play"), Some(id), None]) => Self::ViewPlay(play_id(id)?),
            (&Method::DELETE, [Some("play"), Some(id), None]) => Self::AbandonPlay(play_id(id)?),
            (&Method::POST, [Some("play"), Some(id), Some("submit")]) => Self::SubmitPlay(play_id(id)?),
            (&Method::POST, [Some("play"), Some(id), Some(action)]) => Self::PlayAction(play_id(id)?, action),
            (&Method::GET, [Some("result"), Some(slug), None]) => Self::Result(slug),
            (
                _,
                [Some("topics" | "summaries" | "quiz" | "register" | "login" | "logout" | "score" | "play" | "result"), ..],
            ) => return Err(Error::MethodNotAllowed),
            _ => return Err(Error::NotFound("Not found")),
        };
        Ok(route)
    }
}

/// Looks up a single query parameter. Values are taken verbatim without percent-decoding,
/// which is lossless for the slugs, play identifiers, and filter names read here.
fn query_param<'q>(query: &'q str, name: &str) -> Option<&'q str> {
    query.split('&').find_map(|chunk| {
        let (key, value) = chunk.split_once('=')?;
        (key == name && !value.is_empty()).then_some(value)
    })
}

async fn read_body<B: Body>(body: B) -> Result<Bytes> {
    Ok(body.collect().await.map_err(|_| Error::BadRequest("Cannot read request body"))?.to_bytes())
}

/// Runtime knobs of the service.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    /// Lifetime of a login session.
    pub session_ttl: Duration,
    /// Idle time after which play sessions and handed-off answers are discarded.
    pub play_idle: Duration,
}

pub struct App {
    db: Database,
    content: ContentStore,
    lobby: Lobby,
    handoff: MemoryHandoff,
    settings: Settings,
}

impl App {
    pub fn new(db: Database, content: ContentStore, settings: Settings) -> Self {
        Self { db, content, lobby: Lobby::default(), handoff: MemoryHandoff::new(settings.play_idle), settings }
    }

    /// Makes sure every summarized topic has a row that attempts can reference.
    pub async fn seed_topics(&self) -> db::error::Result<usize> {
        let mut created = 0;
        for (slug, summary) in self.content.summaries() {
            if self.db.upsert_topic(slug, summary).await? {
                log::info!("Seeded topic `{slug}`.");
                created += 1;
            }
        }
        Ok(created)
    }

    /// Discards idle play sessions, lapsed answer hand-offs, and expired login sessions.
    pub async fn sweep(&self) {
        let seats = self.lobby.purge_idle(self.settings.play_idle);
        let answers = self.handoff.purge_expired();
        match self.db.delete_expired_sessions().await {
            Ok(sessions) => log::debug!("Swept {seats} play sessions, {answers} hand-offs, {sessions} login sessions."),
            Err(err) => log::warn!("Cannot sweep login sessions: {err}"),
        }
    }

    pub async fn respond<B: Body>(&self, req: Request<B>) -> Reply {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        match self.try_respond(req).await {
            Ok(res) => {
                log::debug!("{method} {path} -> {}", res.status());
                res
            }
            Err(err) => {
                if err.status() == StatusCode::INTERNAL_SERVER_ERROR {
                    log::error!("{method} {path} failed: {err}");
                } else {
                    log::debug!("{method} {path} -> {}", err.status());
                }
                err.into()
            }
        }
    }

    async fn identify(&self, headers: &HeaderMap) -> Result<Option<User>> {
        auth::identify(&self.db, headers).await
    }

    async fn try_respond<B: Body>(&self, req: Request<B>) -> Result<Reply> {
        let (Parts { method, uri, headers, .. }, body) = req.into_parts();
        let query = uri.query().unwrap_or_default();
        let route = Route::resolve(&method, uri.path())?;

        match route {
            Route::Topics => topics::list(&self.content),
            Route::Topic(slug) => topics::detail(&self.content, slug),
            Route::Summary(slug) => topics::summary(&self.content, slug),
            Route::Quiz(slug) => topics::quiz(&self.content, slug),
            Route::Register => auth::register(&self.db, &read_body(body).await?).await,
            Route::Login => auth::login(&self.db, &read_body(body).await?, self.settings.session_ttl).await,
            Route::Logout => auth::logout(&self.db, &headers).await,
            Route::SaveScore => {
                let user = self.identify(&headers).await?;
                let body = read_body(body).await?;
                score::save(&self.db, user.as_ref(), &body).await
            }
            Route::ScoreHistory => {
                let user = self.identify(&headers).await?;
                score::history(&self.db, user.as_ref(), query_param(query, "slug")).await
            }
            Route::StartPlay(slug) => play::start(&self.content, &self.lobby, slug),
            Route::ViewPlay(id) => play::view(&self.lobby, id),
            Route::PlayAction(id, name) => {
                let body = if play::Action::reads_body(name) { read_body(body).await? } else { Bytes::new() };
                play::act(&self.lobby, id, play::Action::parse(name, &body)?)
            }
            Route::SubmitPlay(id) => {
                let user = self.identify(&headers).await?.map(|user| user.id);
                let recorder = user.map(|user| score::DbRecorder::new(&self.db, user));
                play::submit(&self.lobby, &self.handoff, id, user, recorder.as_ref()).await
            }
            Route::AbandonPlay(id) => play::abandon(&self.lobby, id),
            Route::Result(slug) => {
                let filter = match query_param(query, "filter") {
                    Some(filter) => filter.parse().map_err(|_| Error::BadRequest("Unknown result filter"))?,
                    None => Default::default(),
                };
                let owner = match self.identify(&headers).await? {
                    Some(user) => quiz::Owner::User(user.id),
                    None => {
                        let play = query_param(query, "play").ok_or(Error::BadRequest("Missing play identifier"))?;
                        quiz::Owner::Play(play_id(play)?)
                    }
                };
                result::review(&self.content, &self.handoff, slug, owner, filter)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_routes() {
        assert_eq!(Route::resolve(&Method::GET, "/topics"), Ok(Route::Topics));
        assert_eq!(Route::resolve(&Method::GET, "/topics/iot/"), Ok(Route::Topic("iot")));
        assert_eq!(Route::resolve(&Method::GET, "/quiz/iot"), Ok(Route::Quiz("iot")));
        assert_eq!(Route::resolve(&Method::POST, "/play/iot"), Ok(Route::StartPlay("iot")));
        assert_eq!(
            Route::resolve(&Method::POST, "/play/00000000000000ff/submit"),
            Ok(Route::SubmitPlay(PlayId(255)))
        );
        assert_eq!(
            Route::resolve(&Method::POST, "/play/00000000000000ff/check"),
            Ok(Route::PlayAction(PlayId(255), "check"))
        );
        assert_eq!(Route::resolve(&Method::DELETE, "/play/00000000000000ff"), Ok(Route::AbandonPlay(PlayId(255))));
    }

    #[test]
    fn rejects_unknown_routes() {
        assert_eq!(Route::resolve(&Method::GET, "/nowhere"), Err(Error::NotFound("Not found")));
        assert_eq!(Route::resolve(&Method::GET, "/topics/iot/extra/more"), Err(Error::NotFound("Not found")));
        assert_eq!(Route::resolve(&Method::DELETE, "/topics"), Err(Error::MethodNotAllowed));
        assert_eq!(Route::resolve(&Method::PUT, "/score"), Err(Error::MethodNotAllowed));
        assert!(matches!(Route::resolve(&Method::GET, "/play/not-hex"), Err(Error::NotFound(_))));
    }

    #[test]
    fn reads_query_parameters() {
        let query = "play=00000000000000ff&filter=wrong&empty=";
        assert_eq!(query_param(query, "filter"), Some("wrong"));
        assert_eq!(query_param(query, "play"), Some("00000000000000ff"));
        assert_eq!(query_param(query, "empty"), None);
        assert_eq!(query_param(query, "slug"), None);
        assert_eq!(query_param("", "slug"), None);
    }
}
