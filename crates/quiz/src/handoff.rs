//! Cross-page hand-off of submitted answers to the result view.

use crate::session::Answers;
use model::play::PlayId;
use std::fmt::{self, Display};

/// Whose answers are being handed off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    User(i32),
    /// Anonymous players are only known by their play session.
    Play(PlayId),
}

impl Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user-{id}"),
            Self::Play(id) => write!(f, "play-{id}"),
        }
    }
}

/// Namespaced key under which the answers of one topic are kept for one owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandoffKey(Box<str>);

impl HandoffKey {
    pub const NAMESPACE: &'static str = "quiz_answers";

    pub fn new(slug: &str, owner: Owner) -> Self {
        Self(format!("{}/{slug}/{owner}", Self::NAMESPACE).into_boxed_str())
    }
}

impl Display for HandoffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-value store read by the result view. A later store under the same key replaces the earlier one.
pub trait AnswerHandoff {
    fn store(&self, key: HandoffKey, answers: Answers);
    fn load(&self, key: &HandoffKey) -> Option<Answers>;
}
