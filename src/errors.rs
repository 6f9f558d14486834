use std::path::PathBuf;

use thiserror::Error;

use crate::validator::RuleError;

/// Errors recorded while checking rule files.
#[derive(Error, Debug)]
pub enum CheckError {
    /// A glob pattern could not be parsed.
    #[error("invalid glob pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A pattern failed to expand or expanded to nothing.
    #[error("no matching file found for pattern {pattern:?}")]
    NoMatch {
        pattern: String,
        #[source]
        source: Option<Box<CheckError>>,
    },

    /// A matched file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule file failed validation.
    #[error("{}: {source}", path.display())]
    Rule {
        path: PathBuf,
        #[source]
        source: RuleError,
    },
}

/// Convenience alias for `Result<T, CheckError>`.
pub type Result<T> = std::result::Result<T, CheckError>;
