//! Error types for lectern operations.

use thiserror::Error;

/// Errors that can occur while parsing scripture sources or generating
/// the output document set.
///
/// Only fatal conditions live here. Recoverable parse conditions (stray
/// markers, implicit footnote closes) are reported as
/// [`ParseWarning`](crate::usfm::ParseWarning) values instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown book identifier: {0}")]
    UnknownBook(String),

    #[error("Invalid translation metadata for '{translation}': missing {field}")]
    InvalidMetadata { translation: String, field: String },

    #[error("Invalid USX: {0}")]
    InvalidUsx(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
