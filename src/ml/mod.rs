//! Machine learning collaborators for semchunk-rs
//!
//! This module defines the capability traits the chunking pipeline depends on
//! (embedding, token counting, density clustering) together with the default
//! pure Rust implementations. Any equivalent backend can be substituted at
//! the trait seams; the pipeline only relies on the contracts below.

pub mod cluster;
pub mod embedding;
pub mod models;
pub mod text;

// Re-export main types
pub use cluster::DbscanClusterer;
pub use embedding::{Embedding, EmbeddingConfig, EmbeddingModel};
pub use models::{ModelInfo, ModelManager, ModelType};
pub use text::{TextConfig, TextProcessor, TokenizedText};

use crate::error::Result;

/// Reserved cluster label for points not assigned to any confident cluster
pub const NOISE_LABEL: i64 = -1;

/// Batch text embedding collaborator
///
/// Implementations must be order-preserving: the i-th output vector embeds
/// the i-th input text, and all vectors share one fixed dimension.
pub trait TextEmbedder {
    /// Embed every text into a fixed-dimension vector, one batched call
    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Dimension of the produced vectors
    fn dimension(&self) -> usize;
}

/// Token counting collaborator
///
/// Counts must be deterministic for a fixed model/version.
pub trait TokenCounter {
    /// Number of tokens the underlying tokenizer produces for this text
    fn token_count(&mut self, text: &str) -> Result<usize>;
}

/// Density-based clustering collaborator
///
/// Returns one label per input vector. Labels `>= 0` identify clusters with
/// at least `min_cluster_size` members; [`NOISE_LABEL`] marks points without
/// a confident cluster. Fewer inputs than `min_cluster_size` legitimately
/// yields all-noise labels.
pub trait Clusterer {
    /// Assign a cluster label to every vector
    fn cluster(&self, vectors: &[Embedding], min_cluster_size: usize) -> Result<Vec<i64>>;
}
