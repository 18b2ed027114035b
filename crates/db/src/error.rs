use core::fmt::{self, Display};
use tokio_postgres::error::SqlState;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The object we are trying to insert already exists.
    AlreadyExists,
    /// A referenced row (user, topic, or session) does not exist.
    NotFound,
    /// A table constraint rejected the input.
    BadInput,
    /// Unrecoverable error.
    Fatal,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyExists => "record already exists",
            Self::NotFound => "record not found",
            Self::BadInput => "record violates a table constraint",
            Self::Fatal => "unexpected database failure",
        })
    }
}

impl core::error::Error for Error {}

impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        let Some(err) = err.as_db_error() else {
            log::error!("database connection failure: {err}");
            return Self::Fatal;
        };

        match *err.code() {
            SqlState::UNIQUE_VIOLATION => Self::AlreadyExists,
            SqlState::FOREIGN_KEY_VIOLATION => Self::NotFound,
            SqlState::CHECK_VIOLATION | SqlState::STRING_DATA_RIGHT_TRUNCATION => Self::BadInput,
            _ => {
                log::error!("unclassified database error: {err}");
                Self::Fatal
            }
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
