//! Errors raised while loading content

use std::path::PathBuf;
use thiserror::Error;

/// Why a document could not become a post
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no post found for slug `{0}`")]
    NotFound(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed front-matter: {0}")]
    FrontMatter(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("duplicate slug `{0}`")]
    DuplicateSlug(String),

    #[error("invalid catalog: {0}")]
    Catalog(String),
}

impl From<serde_yaml::Error> for ContentError {
    fn from(err: serde_yaml::Error) -> Self {
        ContentError::FrontMatter(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
