//! Error types for semchunk-rs
//!
//! This module provides error handling for all chunking operations, including
//! paragraph extraction, embedding, clustering, and tokenization.

use thiserror::Error;

/// Main error type for semantic chunking operations
#[derive(Error, Debug)]
pub enum SemChunkError {
    /// Text processing errors
    #[error("Text processing error: {0}")]
    TextProcessing(String),

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Tokenizer errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Density clustering errors
    #[error("Clustering error: {0}")]
    Clustering(String),

    /// Model download/management errors
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(String),
}

/// Result type alias for semantic chunking operations
pub type Result<T> = std::result::Result<T, SemChunkError>;

impl From<anyhow::Error> for SemChunkError {
    fn from(err: anyhow::Error) -> Self {
        SemChunkError::Generic(err.to_string())
    }
}
