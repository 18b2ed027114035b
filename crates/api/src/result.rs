use crate::{
    error::{Error, Result},
    util::response::{self, Reply},
};
use content::ContentStore;
use hyper::StatusCode;
use model::play::Filter;
use quiz::{AnswerHandoff, HandoffKey, Owner};

/// Per-question breakdown of the answers most recently handed off by `owner` for this topic.
pub fn review<H: AnswerHandoff>(content: &ContentStore, handoff: &H, slug: &str, owner: Owner, filter: Filter) -> Result<Reply> {
    let quiz = content.quiz(slug).ok_or(Error::NotFound("Quiz not found"))?;
    let answers = handoff
        .load(&HandoffKey::new(slug, owner))
        .ok_or(Error::NotFound("No answers found for this quiz"))?;
    response::json(StatusCode::OK, &quiz::review::build(slug, quiz, &answers, filter))
}
