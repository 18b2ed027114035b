use crate::{
    error::{Error, Result},
    util::{
        response::{self, Reply},
        session,
    },
};
use db::Database;
use hyper::{
    header::{HeaderValue, SET_COOKIE},
    HeaderMap, StatusCode,
};
use model::user::{Credentials, Registration, User};
use serde::Serialize;
use std::time::Duration;

const BCRYPT_COST: u32 = 10;

#[derive(Serialize)]
struct Registered<'a> {
    user: &'a User,
    message: &'static str,
}

#[derive(Serialize)]
struct LoggedIn<'a> {
    user: &'a User,
}

fn parse<'de, T: serde::Deserialize<'de>>(body: &'de [u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|_| Error::BadRequest("Malformed request body"))
}

/// Resolves the signed-in user from the `sid` cookie. Unknown or expired sessions are anonymous.
pub async fn identify(db: &Database, headers: &HeaderMap) -> Result<Option<User>> {
    let Some(token) = session::extract_session(headers).and_then(session::parse_token) else {
        return Ok(None);
    };
    db.get_session_user(&session::hash_token(&token)).await.map_err(|err| {
        log::error!("cannot resolve session: {err}");
        Error::Persistence("Something went wrong")
    })
}

fn registration_failed(err: db::error::Error) -> Error {
    match err {
        db::error::Error::AlreadyExists => {
            log::info!("Rejected duplicate registration.");
            Error::Conflict("User with this email already exists")
        }
        db::error::Error::BadInput => Error::Validation("Registration details are too long"),
        _ => Error::Persistence("Something went wrong"),
    }
}

pub async fn register(db: &Database, body: &[u8]) -> Result<Reply> {
    let form: Registration = parse(body)?;
    form.validate().map_err(Error::Validation)?;

    let password = String::from(form.password);
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|_| Error::Persistence("Something went wrong"))?
        .map_err(|err| {
            log::error!("cannot hash password: {err}");
            Error::Persistence("Something went wrong")
        })?;

    let user = db.create_user(&form.email, &hash, &form.name).await.map_err(registration_failed)?;

    log::info!("Registered user {}.", user.id);
    response::json(StatusCode::CREATED, &Registered { user: &user, message: "User created successfully" })
}

pub async fn login(db: &Database, body: &[u8], ttl: Duration) -> Result<Reply> {
    const REJECTED: Error = Error::Unauthorized("Invalid email or password");

    let Credentials { email, password } = parse(body)?;
    let (user, hash) = db
        .get_user_by_email(&email)
        .await
        .map_err(|_| Error::Persistence("Something went wrong"))?
        .ok_or(REJECTED)?;

    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password.as_bytes(), &hash))
        .await
        .map_err(|_| Error::Persistence("Something went wrong"))?
        .unwrap_or(false);
    if !verified {
        log::info!("Rejected credentials for user {}.", user.id);
        return Err(REJECTED);
    }

    let token = session::generate_token();
    let lifetime = chrono::Duration::from_std(ttl).map_err(|_| Error::Persistence("Something went wrong"))?;
    let expires = chrono::Utc::now() + lifetime;
    db.create_session(&session::hash_token(&token), user.id, expires)
        .await
        .map_err(|_| Error::Persistence("Something went wrong"))?;

    let cookie = session::set_cookie(&token, ttl.as_secs());
    let cookie = HeaderValue::from_str(&cookie).map_err(|_| Error::Persistence("Something went wrong"))?;
    let mut res = response::json(StatusCode::OK, &LoggedIn { user: &user })?;
    assert!(res.headers_mut().insert(SET_COOKIE, cookie).is_none());

    log::info!("User {} logged in.", user.id);
    Ok(res)
}

pub async fn logout(db: &Database, headers: &HeaderMap) -> Result<Reply> {
    if let Some(token) = session::extract_session(headers).and_then(session::parse_token) {
        let deleted = db
            .delete_session(&session::hash_token(&token))
            .await
            .map_err(|_| Error::Persistence("Something went wrong"))?;
        log::debug!("Logout removed session: {deleted}.");
    }

    let mut res = response::empty(StatusCode::NO_CONTENT);
    assert!(res.headers_mut().insert(SET_COOKIE, HeaderValue::from_static(session::clear_cookie())).is_none());
    Ok(res)
}
