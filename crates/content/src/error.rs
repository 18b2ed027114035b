use serde_json::error::Category;
use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
};

#[derive(Debug)]
pub enum Error {
    /// A content directory or file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// JSON syntax error detected.
    Syntax { slug: Box<str>, source: serde_json::Error },
    /// Well-formed JSON that does not match the content schema.
    Data { slug: Box<str>, source: serde_json::Error },
    /// File stems must be lowercase ASCII letters, digits, and dashes.
    InvalidSlug(Box<str>),
    CountMismatch { slug: Box<str>, declared: u32, actual: usize },
    DuplicateQuestion { slug: Box<str>, id: u32 },
    EmptyPrompt { slug: Box<str>, id: u32 },
    TooFewChoices { slug: Box<str>, id: u32 },
    InvalidChoice { slug: Box<str>, id: u32, label: Box<str> },
    UnknownAnswer { slug: Box<str>, id: u32, label: Box<str> },
    UnknownWrongReason { slug: Box<str>, id: u32, label: Box<str> },
}

impl Error {
    pub(crate) fn json(slug: &str, source: serde_json::Error) -> Self {
        let slug = slug.into();
        match source.classify() {
            Category::Syntax | Category::Eof => Self::Syntax { slug, source },
            _ => Self::Data { slug, source },
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Syntax { slug, source } => write!(f, "syntax error in `{slug}`: {source}"),
            Self::Data { slug, source } => write!(f, "unexpected data in `{slug}`: {source}"),
            Self::InvalidSlug(slug) => write!(f, "`{slug}` is not a valid topic slug"),
            Self::CountMismatch { slug, declared, actual } => {
                write!(f, "`{slug}` declares {declared} questions but contains {actual}")
            }
            Self::DuplicateQuestion { slug, id } => write!(f, "`{slug}` reuses question id {id}"),
            Self::EmptyPrompt { slug, id } => write!(f, "question {id} of `{slug}` has no text"),
            Self::TooFewChoices { slug, id } => write!(f, "question {id} of `{slug}` needs at least two choices"),
            Self::InvalidChoice { slug, id, label } => {
                write!(f, "question {id} of `{slug}` has an empty or repeated choice label `{label}`")
            }
            Self::UnknownAnswer { slug, id, label } => {
                write!(f, "question {id} of `{slug}` names unknown correct answer `{label}`")
            }
            Self::UnknownWrongReason { slug, id, label } => {
                write!(f, "question {id} of `{slug}` explains `{label}` which is not a wrong choice")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Syntax { source, .. } | Self::Data { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
