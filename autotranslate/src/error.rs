//! All error types for the autotranslate crate.
//!
//! Every fallible operation (reading and writing string tables, calling the
//! translator, reconciling a target file) returns [`Error`]. A couple of the
//! variants are "soft": they mean the current file should be skipped rather
//! than reported as a failure. See [`Error::is_skip`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid string table: {0}")]
    Format(String),

    #[error("no translatable strings found in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("target file {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("translation failed: {message}")]
    Gateway {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a new gateway error with optional source error
    pub fn gateway_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Gateway {
            message: message.into(),
            source,
        }
    }

    /// Creates a new format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    /// Whether this error means "skip the file" rather than "the file failed".
    pub fn is_skip(&self) -> bool {
        matches!(self, Error::EmptyInput(_) | Error::AlreadyExists(_))
    }
}
