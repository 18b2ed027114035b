//! Quiz-taking state machine together with grading and the contracts it relies on
//! for persisting attempts and handing answers to the result page.

pub mod handoff;
pub mod recorder;
pub mod review;
pub mod scorer;
pub mod session;

pub use handoff::{AnswerHandoff, HandoffKey, Owner};
pub use recorder::{submit, AttemptRecorder, RecordError};
pub use session::{Answers, QuizSession};
