//! Error types for the parsing and interpreter layers.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps lopdf failures and converts them to [`CleanError`].

use mangaclean_core::CleanError;
use thiserror::Error;

/// Error type for PDF backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] CleanError),
}

impl From<BackendError> for CleanError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => CleanError::Parse(msg),
            BackendError::Io(e) => CleanError::Io(e.to_string()),
            BackendError::Font(msg) => CleanError::Parse(format!("font error: {msg}")),
            BackendError::Interpreter(msg) => {
                CleanError::Parse(format!("content stream error: {msg}"))
            }
            BackendError::Core(e) => e,
        }
    }
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => BackendError::Io(e),
            other => BackendError::Parse(other.to_string()),
        }
    }
}
