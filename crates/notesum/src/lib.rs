//! Notesum - Note summarization engine
//!
//! Summarizes note text through a network provider when one is configured,
//! degrading to a local extractive engine and finally to plain truncation so
//! that valid input always yields a summary.

pub mod config;
pub mod error;
pub mod server;
pub mod summarizer;
pub mod testing;

pub use error::NotesumError;
pub use summarizer::{
    ProviderKind, SummarizationResult, SummarizeOptions, Summarizer, SummarizerError,
    SummaryStyle,
};
