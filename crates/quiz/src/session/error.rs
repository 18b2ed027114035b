use core::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The session is not accepting answers or navigation.
    NotInProgress,
    /// Checking requires a selected answer.
    NoSelection,
    /// The label does not belong to the current question.
    UnknownChoice,
    /// Requested question index lies outside the quiz.
    OutOfRange,
    /// Submission is only offered on the last question.
    NotLastQuestion,
}

impl Error {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotInProgress => "This quiz is not in progress.",
            Self::NoSelection => "Select an answer before checking it.",
            Self::UnknownChoice => "That choice does not belong to the current question.",
            Self::OutOfRange => "There is no question at that position.",
            Self::NotLastQuestion => "Answers can only be submitted from the last question.",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
