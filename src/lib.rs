//! # semchunk-rs
//!
//! Semantic text chunking for retrieval indexing. Long-form text is split
//! into paragraphs, paragraphs are grouped by embedding similarity using
//! density-based clustering, and each group is packed into token-budgeted
//! chunks suitable for downstream embedding and indexing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use semchunk_rs::SemanticChunker;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a chunker with default settings
//!     let mut chunker = SemanticChunker::new(None)?;
//!
//!     let text = std::fs::read_to_string("report.md")?;
//!     let chunks = chunker.create_chunks(&text)?;
//!
//!     for (i, chunk) in chunks.iter().enumerate() {
//!         println!("chunk {}: {} chars", i, chunk.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod chunker;
pub mod config;
pub mod error;
pub mod ml;
pub mod text;

// Re-export main API types
pub use chunker::{SemanticChunker, PARAGRAPH_SEPARATOR};
pub use config::{ChunkingConfig, ClusteringConfig, Config};
pub use error::{Result, SemChunkError};

// Re-export commonly used types
pub use ml::{
    Clusterer, DbscanClusterer, Embedding, EmbeddingConfig, EmbeddingModel, TextEmbedder,
    TextProcessor, TokenCounter, NOISE_LABEL,
};
pub use text::ParagraphExtractor;
