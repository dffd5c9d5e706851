//! Error types for Notesum

use thiserror::Error;

use crate::summarizer::SummarizerError;

/// Main error type for Notesum operations
#[derive(Error, Debug)]
pub enum NotesumError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// Summarization errors surfaced by the engine
    #[error(transparent)]
    Summarizer(#[from] SummarizerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Notesum operations
pub type Result<T> = std::result::Result<T, NotesumError>;
