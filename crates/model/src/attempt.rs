use alloc::boxed::Box;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a score submission. Also what the quiz session hands to the attempt recorder.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScore {
    pub topic_slug: Box<str>,
    /// Number of correctly answered questions.
    pub score: u32,
    pub total_questions: u32,
    pub time_seconds: u32,
}

/// Identifying fields of the topic an attempt belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRef {
    pub slug: Box<str>,
    pub name_en: Box<str>,
    pub name_th: Box<str>,
}

/// A persisted, immutable quiz attempt.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: i64,
    pub user_id: i32,
    pub topic_id: i32,
    pub score: i32,
    pub total_questions: i32,
    pub time_seconds: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub mode: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicRef>,
}

/// Mode tag stored with every attempt created by the quiz flow.
pub const DEFAULT_MODE: &str = "normal";
