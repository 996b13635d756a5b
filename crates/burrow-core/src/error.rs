//! Error types for burrow-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving, opening, or extracting archives
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File suffix is not a recognized archive format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The decoding library reported malformed data
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// Encrypted archive, no password supplied
    #[error("Password required: {0}")]
    PasswordRequired(PathBuf),

    /// Encrypted archive, supplied password rejected
    #[error("Password incorrect: {0}")]
    PasswordIncorrect(PathBuf),

    /// Nested archive exceeds the configured depth limit
    #[error("Depth limit exceeded at {path} (depth {depth})")]
    DepthLimitExceeded { path: PathBuf, depth: u32 },

    /// Invalid file or directory path
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::CorruptArchive(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
