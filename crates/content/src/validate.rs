use crate::error::{Error, Result};
use model::QuizContent;
use std::collections::BTreeSet;

/// Checks that a file stem is usable as a topic slug.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.bytes().all(|byte| matches!(byte, b'a'..=b'z' | b'0'..=b'9' | b'-'))
}

/// Rejects question banks whose internal references do not line up.
pub fn validate_quiz(slug: &str, quiz: &QuizContent) -> Result<()> {
    if usize::try_from(quiz.total_questions).ok() != Some(quiz.questions.len()) {
        return Err(Error::CountMismatch {
            slug: slug.into(),
            declared: quiz.total_questions,
            actual: quiz.questions.len(),
        });
    }

    let mut ids = BTreeSet::new();
    for question in &quiz.questions {
        let id = question.id;
        if !ids.insert(id) {
            return Err(Error::DuplicateQuestion { slug: slug.into(), id });
        }

        if question.question_text.trim().is_empty() {
            return Err(Error::EmptyPrompt { slug: slug.into(), id });
        }

        if question.choices.len() < 2 {
            return Err(Error::TooFewChoices { slug: slug.into(), id });
        }

        let mut labels = BTreeSet::new();
        for choice in &question.choices {
            let label = &*choice.label;
            if label.is_empty() || !labels.insert(label) {
                return Err(Error::InvalidChoice { slug: slug.into(), id, label: label.into() });
            }
        }

        let answer = &*question.correct_answer;
        if !labels.contains(answer) {
            return Err(Error::UnknownAnswer { slug: slug.into(), id, label: answer.into() });
        }

        if let Some(label) = question.wrong_reasons.keys().find(|&label| &**label == answer || !labels.contains(&**label)) {
            return Err(Error::UnknownWrongReason { slug: slug.into(), id, label: label.clone() });
        }
    }

    Ok(())
}
