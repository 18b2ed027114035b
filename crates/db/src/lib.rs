#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;

use alloc::boxed::Box;
use chrono::{DateTime, Duration, Utc};
use model::{
    attempt::{Attempt, TopicRef, DEFAULT_MODE},
    user::User,
    Summary,
};
use tokio_postgres::{types::ToSql, Row};

pub use futures_util::{TryStream, TryStreamExt};
pub use tokio_postgres::{tls::NoTls, Client, Config};

/// Length of a stored session token digest.
pub const TOKEN_LEN: usize = 32;

pub struct Database(Client);

impl From<Client> for Database {
    fn from(client: Client) -> Self {
        Self(client)
    }
}

fn deserialize_user_from_row(row: &Row) -> Result<User, tokio_postgres::Error> {
    let id = row.try_get("id")?;
    let email = row.try_get("email")?;
    let display_name = row.try_get("display_name")?;
    Ok(User { id, email, display_name })
}

fn deserialize_topic_from_row(row: &Row) -> Result<TopicRef, tokio_postgres::Error> {
    let slug = row.try_get("slug")?;
    let name_en = row.try_get("name_en")?;
    let name_th = row.try_get("name_th")?;
    Ok(TopicRef { slug, name_en, name_th })
}

fn deserialize_attempt_from_row(row: &Row, topic: Option<TopicRef>) -> Result<Attempt, tokio_postgres::Error> {
    let id = row.try_get("id")?;
    let user_id = row.try_get("user_id")?;
    let topic_id = row.try_get("topic_id")?;
    let score = row.try_get("score")?;
    let total_questions = row.try_get("total_questions")?;
    let time_seconds = row.try_get("time_seconds")?;
    let started_at = row.try_get("started_at")?;
    let mode = row.try_get("mode")?;
    Ok(Attempt { id, user_id, topic_id, score, total_questions, time_seconds, started_at, mode, topic })
}

fn deserialize_attempt_with_topic(row: Row) -> error::Result<Attempt> {
    let topic = deserialize_topic_from_row(&row).map_err(|_| error::Error::Fatal)?;
    deserialize_attempt_from_row(&row, Some(topic)).map_err(|_| error::Error::Fatal)
}

fn deserialize_attempt(row: Row) -> error::Result<Attempt> {
    deserialize_attempt_from_row(&row, None).map_err(|_| error::Error::Fatal)
}

impl Database {
    /// Creates an account from an already hashed password.
    pub async fn create_user(&self, email: &str, password_hash: &str, display_name: &str) -> error::Result<User> {
        let row = self
            .0
            .query_one(
                "INSERT INTO users (email, password_hash, display_name) VALUES ($1, $2, $3) \
                 RETURNING id, email, display_name",
                &[&email, &password_hash, &display_name],
            )
            .await?;
        deserialize_user_from_row(&row).map_err(|_| error::Error::Fatal)
    }

    /// Looks up an account together with its password hash for credential checks.
    pub async fn get_user_by_email(&self, email: &str) -> error::Result<Option<(User, Box<str>)>> {
        let Some(row) = self
            .0
            .query_opt("SELECT id, email, display_name, password_hash FROM users WHERE email = $1", &[&email])
            .await?
        else {
            return Ok(None);
        };
        let user = deserialize_user_from_row(&row).map_err(|_| error::Error::Fatal)?;
        let hash = row.try_get("password_hash").map_err(|_| error::Error::Fatal)?;
        Ok(Some((user, hash)))
    }

    /// Inserts the topic if it is missing. Existing rows are left untouched.
    /// Returns `true` if a new row was created.
    pub async fn upsert_topic(&self, slug: &str, summary: &Summary) -> error::Result<bool> {
        let reading_time = i16::try_from(summary.reading_time_min).map_err(|_| error::Error::BadInput)?;
        let name_en: &str = &summary.name_en;
        let name_th: &str = &summary.name_th;
        let inserted = self
            .0
            .execute(
                "INSERT INTO topic (slug, name_en, name_th, sort_order, reading_time_min) \
                 VALUES ($1, $2, $3, $4, $5) ON CONFLICT (slug) DO NOTHING",
                &[&slug, &name_en, &name_th, &summary.sort_order, &reading_time],
            )
            .await?;
        Ok(inserted == 1)
    }

    /// Persists one attempt for the topic identified by `slug`. The attempt is taken to
    /// have started `time_seconds` ago.
    pub async fn create_attempt(
        &self,
        user: i32,
        slug: &str,
        score: u32,
        total_questions: u32,
        time_seconds: u32,
    ) -> error::Result<i64> {
        let score = i32::try_from(score).map_err(|_| error::Error::BadInput)?;
        let total = i32::try_from(total_questions).map_err(|_| error::Error::BadInput)?;
        let time = i32::try_from(time_seconds).map_err(|_| error::Error::BadInput)?;
        let started_at = Utc::now() - Duration::seconds(time.into());

        let row = self
            .0
            .query_opt(
                "INSERT INTO attempt (user_id, topic_id, score, total_questions, time_seconds, started_at, mode) \
                 SELECT $1::INT4, id, $3::INT4, $4::INT4, $5::INT4, $6::TIMESTAMPTZ, $7::TEXT FROM topic WHERE slug = $2 \
                 RETURNING id",
                &[&user, &slug, &score, &total, &time, &started_at, &DEFAULT_MODE],
            )
            .await?
            // No topic row matched the slug.
            .ok_or(error::Error::NotFound)?;
        row.try_get("id").map_err(|_| error::Error::Fatal)
    }

    /// The 20 most recent attempts of the user across all topics.
    pub async fn get_attempts(
        &self,
        user: i32,
    ) -> error::Result<impl TryStream<Ok = Attempt, Error = error::Error> + '_> {
        Ok(self
            .0
            .query_raw(
                "SELECT a.id, a.user_id, a.topic_id, a.score, a.total_questions, a.time_seconds, a.started_at, a.mode, \
                 t.slug, t.name_en, t.name_th \
                 FROM attempt a JOIN topic t ON t.id = a.topic_id \
                 WHERE a.user_id = $1 ORDER BY a.started_at DESC LIMIT 20",
                &[&user],
            )
            .await?
            .map_err(error::Error::from)
            .and_then(|row| core::future::ready(deserialize_attempt_with_topic(row))))
    }

    /// The 5 most recent attempts of the user on one topic.
    pub async fn get_attempts_for_topic(
        &self,
        user: i32,
        slug: &str,
    ) -> error::Result<impl TryStream<Ok = Attempt, Error = error::Error>> {
        let params: [&(dyn ToSql + Sync); 2] = [&user, &slug];
        Ok(self
            .0
            .query_raw(
                "SELECT a.id, a.user_id, a.topic_id, a.score, a.total_questions, a.time_seconds, a.started_at, a.mode \
                 FROM attempt a JOIN topic t ON t.id = a.topic_id \
                 WHERE a.user_id = $1 AND t.slug = $2 ORDER BY a.started_at DESC LIMIT 5",
                params,
            )
            .await?
            .map_err(error::Error::from)
            .and_then(|row| core::future::ready(deserialize_attempt(row))))
    }

    pub async fn create_session(&self, token: &[u8; TOKEN_LEN], user: i32, expires_at: DateTime<Utc>) -> error::Result<()> {
        let token = &token[..];
        self.0
            .execute("INSERT INTO session (token, user_id, expires_at) VALUES ($1, $2, $3)", &[&token, &user, &expires_at])
            .await?;
        Ok(())
    }

    /// Resolves a live session to its user. Expired sessions resolve to nobody.
    pub async fn get_session_user(&self, token: &[u8; TOKEN_LEN]) -> error::Result<Option<User>> {
        let token = &token[..];
        let row = self
            .0
            .query_opt(
                "SELECT u.id, u.email, u.display_name FROM session s JOIN users u ON u.id = s.user_id \
                 WHERE s.token = $1 AND s.expires_at > NOW()",
                &[&token],
            )
            .await?;
        row.as_ref().map(deserialize_user_from_row).transpose().map_err(|_| error::Error::Fatal)
    }

    /// Returns `true` if a session was actually removed.
    pub async fn delete_session(&self, token: &[u8; TOKEN_LEN]) -> error::Result<bool> {
        let token = &token[..];
        let deleted = self.0.execute("DELETE FROM session WHERE token = $1", &[&token]).await?;
        Ok(deleted == 1)
    }

    pub async fn delete_expired_sessions(&self) -> error::Result<u64> {
        Ok(self.0.execute("DELETE FROM session WHERE expires_at <= NOW()", &[]).await?)
    }
}
