//! Error types for the code database and the placeholder engine.

use std::path::PathBuf;

use thiserror::Error;

/// Why a user-entered value could not be encoded.
///
/// `Range` errors make an input field revert to its last valid value; `Format`
/// errors only block confirmation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value parsed but does not fit the declared width/type.
    #[error("value out of range: {0}")]
    Range(String),

    /// The text is not a value of the requested kind at all.
    #[error("invalid value: {0}")]
    Format(String),
}

impl EncodeError {
    pub fn is_range(&self) -> bool {
        matches!(self, EncodeError::Range(_))
    }
}

/// The error type for database operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while reading a code file.
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("{path:?} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    /// A code still contains placeholders that need user input.
    #[error("code '{name}' still has unresolved mods")]
    Unresolved { name: String },

    /// The node id does not refer to a code entry.
    #[error("node {0} is not a code")]
    NotACode(usize),

    /// No code matched the given `Group/Sub/Code` path.
    #[error("no code at path '{0}'")]
    CodeNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
