use crate::{
    content::{Choice, Difficulty},
    score::{Grade, Score},
};
use alloc::{boxed::Box, string::String, vec::Vec};
use core::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Handle of a server-held quiz session. Travels as 16 lowercase hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayId(pub u64);

impl Display for PlayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidPlayId;

impl Display for InvalidPlayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("play identifiers are 16 hexadecimal digits")
    }
}

impl FromStr for PlayId {
    type Err = InvalidPlayId;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.len() != 16 || !text.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(InvalidPlayId);
        }
        u64::from_str_radix(text, 16).map(Self).map_err(|_| InvalidPlayId)
    }
}

impl Serialize for PlayId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PlayIdVisitor;

impl<'de> Visitor<'de> for PlayIdVisitor {
    type Value = PlayId;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a hexadecimal play identifier")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for PlayId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PlayIdVisitor)
    }
}

/// Lifecycle of a quiz session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the question bank.
    Loading,
    /// The question bank could not be found. Terminal.
    Unavailable,
    InProgress,
    /// Score computed; the attempt is being recorded.
    Saving,
    Submitted,
}

/// Correctness feedback revealed once a question is checked.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub is_correct: bool,
    pub correct_answer: Box<str>,
    pub explanation: Box<str>,
    pub wrong_reason: Option<Box<str>>,
}

/// A question stripped of everything that would give the answer away.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView<'a> {
    pub id: u32,
    pub question_text: &'a str,
    pub difficulty: Difficulty,
    pub tags: &'a [Box<str>],
    pub choices: &'a [Choice],
}

/// Snapshot of a quiz session as presented to the player.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayView<'a> {
    pub play_id: PlayId,
    pub topic_slug: &'a str,
    pub topic_name: &'a str,
    pub phase: Phase,
    pub index: usize,
    pub total: usize,
    pub answered: usize,
    pub elapsed_seconds: u64,
    pub question: Option<QuestionView<'a>>,
    pub selected: Option<&'a str>,
    pub checked: bool,
    pub feedback: Option<Feedback>,
}

/// Response to a completed submission.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub score: Score,
    pub grade: Grade,
    pub elapsed_seconds: u64,
    /// `elapsed_seconds` as `m:ss`.
    pub elapsed_time: String,
    /// `None` when the player is anonymous or the attempt could not be recorded.
    pub attempt_id: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Correct,
    Wrong,
}

impl FromStr for Filter {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(match text {
            "all" => Self::All,
            "correct" => Self::Correct,
            "wrong" => Self::Wrong,
            _ => return Err(()),
        })
    }
}

impl Filter {
    pub const fn admits(self, is_correct: bool) -> bool {
        match self {
            Self::All => true,
            Self::Correct => is_correct,
            Self::Wrong => !is_correct,
        }
    }
}

/// One graded question of the result page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRow<'a> {
    pub id: u32,
    pub question_text: &'a str,
    pub difficulty: Difficulty,
    pub choices: &'a [Choice],
    pub correct_answer: &'a str,
    pub user_answer: Option<&'a str>,
    pub is_correct: bool,
    pub explanation: &'a str,
    pub wrong_reason: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review<'a> {
    pub topic_slug: &'a str,
    pub topic_name: &'a str,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub score: Score,
    pub grade: Grade,
    /// Rows admitted by the requested filter. Counts above always cover every question.
    pub questions: Vec<ReviewRow<'a>>,
}
