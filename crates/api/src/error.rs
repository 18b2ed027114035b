use core::fmt::{self, Display};
use hyper::StatusCode;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Unknown topic, quiz, user, or play session.
    NotFound(&'static str),
    /// No valid session, or rejected credentials.
    Unauthorized(&'static str),
    /// Malformed registration or score input.
    Validation(&'static str),
    /// The request conflicts with existing state.
    Conflict(&'static str),
    /// The request could not be understood at all.
    BadRequest(&'static str),
    MethodNotAllowed,
    /// Unclassified backend error.
    Persistence(&'static str),
}

impl Error {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg)
            | Self::BadRequest(msg)
            | Self::Persistence(msg) => msg,
            Self::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<quiz::session::error::Error> for Error {
    fn from(err: quiz::session::error::Error) -> Self {
        use quiz::session::error::Error as Session;
        let msg = err.as_str();
        match err {
            Session::NotInProgress | Session::NotLastQuestion => Self::Conflict(msg),
            Session::NoSelection | Session::UnknownChoice | Session::OutOfRange => Self::BadRequest(msg),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
