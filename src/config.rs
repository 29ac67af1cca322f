//! Configuration types for semchunk-rs
//!
//! All tunable parameters of the chunking pipeline live here. Configurations
//! are serde-serializable and can be loaded from or saved to JSON files.

use crate::error::Result;
use crate::ml::embedding::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chunking pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Lines with at most this many whitespace-separated words are discarded
    /// during paragraph extraction (filters headers, captions, noise lines)
    pub min_paragraph_words: usize,

    /// Minimum cluster membership for the first clustering pass
    pub min_cluster_size: usize,

    /// Relaxed minimum cluster membership for the single orphan re-pass
    pub orphan_cluster_size: usize,

    /// Maximum token budget per packed chunk. A single paragraph over the
    /// budget is emitted whole as its own chunk, never split.
    pub max_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_paragraph_words: 10,
            min_cluster_size: 3,
            orphan_cluster_size: 2,
            max_tokens: 300,
        }
    }
}

/// Density clustering parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Euclidean neighborhood radius used by the DBSCAN backend. Embeddings
    /// are unit-normalized, so pairwise distances fall in [0, 2].
    pub epsilon: f32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self { epsilon: 1.0 }
    }
}

/// Top-level configuration for the chunking pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Paragraph extraction and chunk packing parameters
    pub chunking: ChunkingConfig,

    /// Embedding model parameters
    pub embedding: EmbeddingConfig,

    /// Density clustering parameters
    pub clustering: ClusteringConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
