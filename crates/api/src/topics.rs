use crate::{
    error::{Error, Result},
    util::response::{self, Reply},
};
use content::ContentStore;
use hyper::StatusCode;
use model::content::TopicListing;
use serde::Serialize;

#[derive(Serialize)]
struct Topics<'a> {
    topics: Vec<TopicListing<'a>>,
}

pub fn list(content: &ContentStore) -> Result<Reply> {
    let topics = content.listings().collect();
    response::json(StatusCode::OK, &Topics { topics })
}

pub fn detail(content: &ContentStore, slug: &str) -> Result<Reply> {
    let detail = content.detail(slug).ok_or(Error::NotFound("Topic not found"))?;
    response::json(StatusCode::OK, &detail)
}

pub fn summary(content: &ContentStore, slug: &str) -> Result<Reply> {
    let summary = content.summary(slug).ok_or(Error::NotFound("Summary not found"))?;
    response::json(StatusCode::OK, summary)
}

/// The full question bank, answers included.
pub fn quiz(content: &ContentStore, slug: &str) -> Result<Reply> {
    let quiz = content.quiz(slug).ok_or(Error::NotFound("Quiz not found"))?;
    response::json(StatusCode::OK, &**quiz)
}
