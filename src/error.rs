use std::path::PathBuf;
use thiserror::Error;

use crate::tags::GrammaticalClass;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, WordFreqError>;

/// Enum representing all possible errors in the wordfreq_rs library.
///
/// The first four variants are the pipeline failures (one per stage); the rest come from the
/// lexical database backend and the runtime. Every variant is fatal to a run.
#[derive(Error, Debug)]
pub enum WordFreqError {
    #[error("Could not decode corpus {path:?}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Malformed corpus data: {0}")]
    ParseError(String),

    #[error("Lexical database lookup failed for '{word}' ({class}): {reason}")]
    LookupError {
        word: String,
        class: GrammaticalClass,
        reason: String,
    },

    #[error("Failed to write word list to {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::DeError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Data directory not found or could not be determined")]
    DataDirNotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String), // For unexpected situations
}
