pub mod error;

use crate::scorer;
use error::{Error, Result};
use model::{
    play::{Feedback, Phase, PlayId, PlayView, QuestionView},
    QuizContent, Question, Score,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::Duration,
};

/// Chosen label keyed by question id.
pub type Answers = BTreeMap<u32, Box<str>>;

/// One player's pass through a question bank.
///
/// The session starts out [`Phase::Loading`] and only accepts answers once a bank is
/// loaded. Answers and checked questions only ever grow until [`QuizSession::restart`],
/// and a checked question keeps its answer. The current index always points at an
/// existing question whenever the bank is non-empty.
#[derive(Debug)]
pub struct QuizSession {
    slug: Box<str>,
    quiz: Option<Arc<QuizContent>>,
    phase: Phase,
    index: usize,
    answers: Answers,
    checked: BTreeSet<u32>,
    elapsed: Duration,
}

impl QuizSession {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.into(),
            quiz: None,
            phase: Phase::Loading,
            index: 0,
            answers: Answers::new(),
            checked: BTreeSet::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Shorthand for a session whose bank is already at hand.
    pub fn start(slug: &str, quiz: Arc<QuizContent>) -> Self {
        let mut session = Self::new(slug);
        session.load(Some(quiz));
        session
    }

    /// Completes loading. A missing bank leaves the session [`Phase::Unavailable`].
    pub fn load(&mut self, quiz: Option<Arc<QuizContent>>) -> Phase {
        if self.phase != Phase::Loading {
            return self.phase;
        }

        self.phase = match quiz {
            Some(quiz) => {
                self.quiz = Some(quiz);
                Phase::InProgress
            }
            None => {
                log::debug!("No question bank for `{}`.", self.slug);
                Phase::Unavailable
            }
        };
        self.phase
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn is_checked(&self, id: u32) -> bool {
        self.checked.contains(&id)
    }

    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn quiz(&self) -> Option<&QuizContent> {
        self.quiz.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        match self.quiz.as_deref() {
            Some(quiz) => &quiz.questions,
            None => &[],
        }
    }

    pub fn total(&self) -> usize {
        self.questions().len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions().get(self.index)
    }

    /// Advances the clock. Time only counts while answers are still accepted.
    pub fn tick(&mut self, delta: Duration) {
        if self.phase == Phase::InProgress {
            self.elapsed = self.elapsed.saturating_add(delta);
        }
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.phase == Phase::InProgress {
            Ok(())
        } else {
            Err(Error::NotInProgress)
        }
    }

    /// Records `label` as the answer to the current question. Returns `false` without
    /// touching the stored answer if the question has already been checked.
    pub fn select(&mut self, label: &str) -> Result<bool> {
        self.ensure_in_progress()?;
        let question = self.current().ok_or(Error::OutOfRange)?;
        if self.checked.contains(&question.id) {
            return Ok(false);
        }

        let choice = question.choice(label).ok_or(Error::UnknownChoice)?;
        let (id, label) = (question.id, choice.label.clone());
        self.answers.insert(id, label);
        Ok(true)
    }

    /// Locks the current question and reveals whether its answer is correct.
    /// Checking an already checked question reveals the same feedback again.
    pub fn check(&mut self) -> Result<Feedback> {
        self.ensure_in_progress()?;
        let question = self.current().ok_or(Error::OutOfRange)?;
        let label = self.answers.get(&question.id).ok_or(Error::NoSelection)?;
        let feedback = feedback(question, label);
        let id = question.id;
        self.checked.insert(id);
        Ok(feedback)
    }

    pub fn next(&mut self) -> Result<usize> {
        self.go_to(self.index.saturating_add(1).min(self.total().saturating_sub(1)))
    }

    pub fn prev(&mut self) -> Result<usize> {
        self.go_to(self.index.saturating_sub(1))
    }

    /// Jumps to any question. Unchecked questions may be skipped.
    pub fn go_to(&mut self, index: usize) -> Result<usize> {
        self.ensure_in_progress()?;
        if index >= self.total() {
            return Err(Error::OutOfRange);
        }
        self.index = index;
        Ok(index)
    }

    pub fn score(&self) -> Score {
        scorer::score(self.questions(), &self.answers)
    }

    /// Freezes the session and grades it. Must be requested from the last question.
    pub fn begin_submit(&mut self) -> Result<Score> {
        self.ensure_in_progress()?;
        let total = self.total();
        if total > 0 && self.index + 1 != total {
            return Err(Error::NotLastQuestion);
        }
        self.phase = Phase::Saving;
        Ok(self.score())
    }

    /// Settles the session regardless of whether the attempt was recorded.
    pub fn finish_submit(&mut self) -> Result<()> {
        if self.phase != Phase::Saving {
            return Err(Error::NotInProgress);
        }
        self.phase = Phase::Submitted;
        Ok(())
    }

    /// Discards all progress and waits for the bank to be loaded again.
    pub fn restart(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Submitted | Phase::Unavailable) {
            return Err(Error::NotInProgress);
        }
        *self = Self::new(&self.slug);
        Ok(())
    }

    pub fn view(&self, id: PlayId) -> PlayView<'_> {
        let question = self.current();
        let selected = question.and_then(|question| self.answers.get(&question.id)).map(|label| &**label);
        let checked = question.is_some_and(|question| self.checked.contains(&question.id));
        let feedback = match (question, selected) {
            (Some(question), Some(label)) if checked => Some(feedback(question, label)),
            _ => None,
        };

        PlayView {
            play_id: id,
            topic_slug: &self.slug,
            topic_name: self.quiz.as_deref().map_or("", |quiz| &*quiz.topic_name),
            phase: self.phase,
            index: self.index,
            total: self.total(),
            answered: self.answers.len(),
            elapsed_seconds: self.elapsed.as_secs(),
            question: question.map(|question| QuestionView {
                id: question.id,
                question_text: &question.question_text,
                difficulty: question.difficulty,
                tags: &question.tags,
                choices: &question.choices,
            }),
            selected,
            checked,
            feedback,
        }
    }
}

fn feedback(question: &Question, label: &str) -> Feedback {
    Feedback {
        is_correct: question.is_correct(label),
        correct_answer: question.correct_answer.clone(),
        explanation: question.explanation.clone(),
        wrong_reason: question.wrong_reason(label).map(Into::into),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use model::{Choice, Difficulty};

    pub fn bank(count: u32) -> Arc<QuizContent> {
        let questions = (1..=count)
            .map(|id| Question {
                id,
                question_text: format!("Question {id}?").into(),
                difficulty: Difficulty::Medium,
                tags: Vec::new(),
                choices: ["A", "B", "C", "D"]
                    .into_iter()
                    .map(|label| Choice { label: label.into(), text: format!("Choice {label}").into() })
                    .collect(),
                correct_answer: "C".into(),
                explanation: "C is right.".into(),
                wrong_reasons: [("A".into(), "A is a trap.".into())].into_iter().collect(),
            })
            .collect();
        Arc::new(QuizContent {
            topic_id: "iot".into(),
            topic_name: "Internet of Things".into(),
            total_questions: count,
            questions,
        })
    }

    #[test]
    fn loading_transitions() {
        let mut session = QuizSession::new("iot");
        assert_eq!(session.phase(), Phase::Loading);
        assert_eq!(session.select("A"), Err(Error::NotInProgress));
        assert_eq!(session.load(Some(bank(3))), Phase::InProgress);
        assert_eq!(session.load(None), Phase::InProgress);

        let mut missing = QuizSession::new("unknown-slug");
        assert_eq!(missing.load(None), Phase::Unavailable);
        assert!(missing.current().is_none());
        assert_eq!(missing.next(), Err(Error::NotInProgress));
        assert_eq!(missing.view(PlayId(1)).total, 0);
    }

    #[test]
    fn select_then_check_locks_the_answer() {
        let mut session = QuizSession::start("iot", bank(3));
        assert_eq!(session.check(), Err(Error::NoSelection));
        assert_eq!(session.select("A"), Ok(true));
        assert_eq!(session.select("B"), Ok(true));
        assert_eq!(session.answers().get(&1).map(|label| &**label), Some("B"));

        let feedback = session.check().unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_answer.as_ref(), "C");
        assert!(feedback.wrong_reason.is_none());
        assert!(session.is_checked(1));

        assert_eq!(session.select("C"), Ok(false));
        assert_eq!(session.answers().get(&1).map(|label| &**label), Some("B"));
    }

    #[test]
    fn checking_twice_is_idempotent() {
        let mut session = QuizSession::start("iot", bank(2));
        session.select("A").unwrap();
        let first = session.check().unwrap();
        let answers = session.answers().clone();
        let second = session.check().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.wrong_reason.as_deref(), Some("A is a trap."));
        assert_eq!(session.answers(), &answers);
        assert_eq!(session.checked.len(), 1);
    }

    #[test]
    fn rejects_foreign_labels() {
        let mut session = QuizSession::start("iot", bank(1));
        assert_eq!(session.select("Z"), Err(Error::UnknownChoice));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut session = QuizSession::start("iot", bank(3));
        assert_eq!(session.prev(), Ok(0));
        assert_eq!(session.next(), Ok(1));
        assert_eq!(session.next(), Ok(2));
        assert_eq!(session.next(), Ok(2));
        assert_eq!(session.go_to(3), Err(Error::OutOfRange));
        assert_eq!(session.index(), 2);
        assert_eq!(session.go_to(0), Ok(0));
        assert_eq!(session.prev(), Ok(0));
    }

    #[test]
    fn empty_bank_has_no_question_to_answer() {
        let mut session = QuizSession::start("iot", bank(0));
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.select("A"), Err(Error::OutOfRange));
        assert_eq!(session.next(), Err(Error::OutOfRange));
        assert_eq!(session.begin_submit(), Ok(Score::new(0, 0)));
    }

    #[test]
    fn submit_only_from_last_question() {
        let mut session = QuizSession::start("iot", bank(2));
        assert_eq!(session.begin_submit(), Err(Error::NotLastQuestion));
        session.next().unwrap();
        session.select("C").unwrap();
        assert_eq!(session.begin_submit(), Ok(Score::new(1, 2)));
        assert_eq!(session.phase(), Phase::Saving);
        assert_eq!(session.select("A"), Err(Error::NotInProgress));
        session.finish_submit().unwrap();
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(session.finish_submit(), Err(Error::NotInProgress));
    }

    #[test]
    fn clock_stops_once_submission_begins() {
        let mut session = QuizSession::new("iot");
        session.tick(Duration::from_secs(5));
        assert_eq!(session.elapsed(), Duration::ZERO);

        session.load(Some(bank(1)));
        session.tick(Duration::from_secs(30));
        session.tick(Duration::from_secs(12));
        session.begin_submit().unwrap();
        session.tick(Duration::from_secs(100));
        assert_eq!(session.elapsed(), Duration::from_secs(42));
    }

    #[test]
    fn restart_clears_progress() {
        let mut session = QuizSession::start("iot", bank(1));
        assert_eq!(session.restart(), Err(Error::NotInProgress));
        session.select("C").unwrap();
        session.check().unwrap();
        session.tick(Duration::from_secs(9));
        session.begin_submit().unwrap();
        session.finish_submit().unwrap();

        session.restart().unwrap();
        assert_eq!(session.phase(), Phase::Loading);
        assert!(session.answers().is_empty());
        assert!(!session.is_checked(1));
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(session.slug(), "iot");
        assert_eq!(session.load(Some(bank(1))), Phase::InProgress);
    }

    #[test]
    fn view_hides_answer_until_checked() {
        let mut session = QuizSession::start("iot", bank(2));
        session.select("A").unwrap();
        let view = session.view(PlayId(7));
        assert_eq!(view.selected, Some("A"));
        assert!(!view.checked);
        assert!(view.feedback.is_none());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["question"].get("correctAnswer").is_none());
        assert_eq!(json["playId"], "0000000000000007");
        assert_eq!(json["phase"], "in_progress");

        session.check().unwrap();
        let view = session.view(PlayId(7));
        assert!(view.checked);
        assert_eq!(view.feedback.unwrap().correct_answer.as_ref(), "C");
        assert_eq!(view.answered, 1);
    }
}
