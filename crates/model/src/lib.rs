#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod attempt;
pub mod content;
pub mod play;
pub mod score;
pub mod user;

pub use content::{Choice, Difficulty, QuizContent, Question, Summary};
pub use score::{Grade, Score, Stats};
