//! Error types shared by every stage of a conversion.
//!
//! Every variant is fatal: the conversion stops at the first error and
//! nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input document is not a well-formed proxy history export.
    #[error("failed to parse proxy history: {0}")]
    Parse(String),

    /// A request or response payload is not valid base64.
    #[error("record {record}: {column} payload is not valid base64: {source}")]
    Decode {
        record: usize,
        column: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// Reading the input or writing the output failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Sink failure with no path attached (renderer writing to an arbitrary writer).
    #[error(transparent)]
    Write(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
