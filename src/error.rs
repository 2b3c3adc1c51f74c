use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration and building the shared state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A `[types]` entry that does not name a built-in keyable type.
    #[error("unknown keyable type name: '{0}'")]
    UnknownTypeName(String),

    #[error("statement '{0}' is defined more than once")]
    DuplicateStatement(String),
}

/// Errors from the JSON array column codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Non-blank text that is not valid JSON.
    #[error("malformed JSON array text: {0}")]
    Decode(#[source] serde_json::Error),

    /// Valid JSON whose root is not an array.
    #[error("expected a JSON array, found {found}")]
    NotAnArray { found: &'static str },

    #[error("failed to encode JSON array: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read column text: {0}")]
    Column(#[from] sqlx::Error),
}

/// Errors from reading a property off a parameter object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("malformed property path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("no property '{0}'")]
    NotFound(String),

    #[error("property '{path}' could not be read: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Reasons the blank-SQL fallback could not rebuild statement text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no SQL source available for statement '{0}'")]
    NoSqlSource(String),

    #[error("statement '{id}' is a {command} statement; only selects are rebuilt")]
    UnsupportedCommand { id: String, command: &'static str },

    #[error("unterminated placeholder at byte {offset} in statement '{id}'")]
    UnterminatedPlaceholder { id: String, offset: usize },

    #[error("empty placeholder at byte {offset} in statement '{id}'")]
    EmptyPlaceholder { id: String, offset: usize },
}
