//! Typed pipeline errors.
//!
//! Path-policy rejections never appear here: `DiskScout::add_path` surfaces
//! them through its `(false, message)` return instead of an error value.

use std::io;

/// Failures surfaced by the QA pipeline.
#[derive(Debug)]
pub enum Error {
    /// The uploaded file's extension is not a supported format.
    /// Fatal for that ingestion only.
    UnsupportedFormat(String),
    /// A parser failed on an otherwise supported format.
    Extract(String),
    /// The local inference endpoint could not produce a response.
    /// Propagates unrecovered on both QA paths; only keyword extraction
    /// recovers locally.
    ModelUnavailable(String),
    /// Nothing to ground an answer on: no documents indexed yet, or no
    /// scout matches. A user-visible warning, not a crash.
    EmptyResult(String),
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedFormat(ext) => write!(f, "unsupported file type: {}", ext),
            Error::Extract(msg) => write!(f, "extraction failed: {}", msg),
            Error::ModelUnavailable(msg) => write!(f, "model unavailable: {}", msg),
            Error::EmptyResult(msg) => write!(f, "{}", msg),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
