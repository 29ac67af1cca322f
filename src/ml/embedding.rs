//! Embedding generation for paragraph vectors
//!
//! Default [`TextEmbedder`] implementation. Vectors are derived
//! deterministically from tokenizer output: token IDs are distributed across
//! the embedding dimensions through several hash projections with positional
//! weighting, matching the MiniLM 384-dimension geometry. Paragraphs sharing
//! vocabulary land close together under Euclidean distance, which is what the
//! density clustering stage consumes.

use crate::error::Result;
use crate::ml::models::ModelManager;
use crate::ml::text::{TextConfig, TextProcessor};
use crate::ml::TextEmbedder;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// MiniLM-L6-v2 embedding dimension
pub const EMBEDDING_DIM: usize = 384;

/// Configuration for embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name or path
    pub model_name: String,
    /// Maximum sequence length
    pub max_length: usize,
    /// Whether to normalize embeddings to unit length
    pub normalize: bool,
    /// Batch size for processing
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            max_length: 512,
            normalize: true,
            batch_size: 32,
        }
    }
}

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Token-feature embedding model
///
/// Construction never touches the network; call [`EmbeddingModel::load_model`]
/// to fetch and attach the real tokenizer. Without it, a word-hash fallback
/// tokenization feeds the same embedding scheme.
pub struct EmbeddingModel {
    /// Configuration
    config: EmbeddingConfig,
    /// Text processor for tokenization
    text_processor: TextProcessor,
    /// Embedding cache keyed by input text
    cache: HashMap<String, Embedding>,
    /// Model manager for tokenizer files
    model_manager: ModelManager,
    /// Whether a real tokenizer is loaded
    is_ready: bool,
}

impl EmbeddingModel {
    /// Create new embedding model
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        log::info!("Initializing embedding model: {}", config.model_name);

        let text_config = TextConfig {
            max_length: config.max_length,
            ..Default::default()
        };
        let text_processor = TextProcessor::new(text_config);
        let model_manager = ModelManager::new(None)?;

        Ok(Self {
            config,
            text_processor,
            cache: HashMap::new(),
            model_manager,
            is_ready: false,
        })
    }

    /// Download (or reuse cached) tokenizer files and load the tokenizer
    ///
    /// Returns the local model directory so callers can share it with other
    /// tokenizer consumers.
    pub fn load_model(&mut self) -> Result<PathBuf> {
        log::info!("Loading tokenizer for model: {}", self.config.model_name);

        let model_dir = self.model_manager.download_model(&self.config.model_name)?;
        self.text_processor.load_tokenizer(&model_dir)?;
        self.is_ready = true;

        Ok(model_dir)
    }

    /// Generate embedding for a single text
    pub fn encode(&mut self, text: &str) -> Result<Embedding> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }

        let embedding = self.embed_text(text)?;
        self.cache.insert(text.to_string(), embedding.clone());

        Ok(embedding)
    }

    /// Generate embeddings for multiple texts, order-preserving
    pub fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
        let batch_size = self.config.batch_size.max(1);
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size) {
            for text in chunk {
                embeddings.push(self.encode(text)?);
            }
        }

        Ok(embeddings)
    }

    /// Generate embeddings for multiple texts with parallel processing
    ///
    /// Any single failure fails the whole batch; the chunking result is
    /// meaningless with holes in it.
    pub fn encode_batch_parallel(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
        use rayon::prelude::*;

        let batch_size = self.config.batch_size.max(1);
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size) {
            let chunk_embeddings: Vec<Embedding> = chunk
                .par_iter()
                .map(|text| self.embed_text(text))
                .collect::<Result<Vec<_>>>()?;

            for (text, embedding) in chunk.iter().zip(chunk_embeddings) {
                self.cache.insert(text.clone(), embedding.clone());
                embeddings.push(embedding);
            }
        }

        Ok(embeddings)
    }

    /// Derive an embedding from tokenizer output
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        use std::hash::{Hash, Hasher};

        let tokenized = self.text_processor.tokenize(text)?;

        let mut embedding = vec![0.0f32; EMBEDDING_DIM];

        // Only non-padding positions contribute
        let valid_tokens: Vec<u32> = tokenized
            .input_ids
            .iter()
            .zip(tokenized.attention_mask.iter())
            .filter(|(_, mask)| **mask == 1)
            .map(|(token_id, _)| *token_id)
            .collect();

        if !valid_tokens.is_empty() {
            for (i, &token_id) in valid_tokens.iter().enumerate() {
                // Several hash projections per token for better distribution
                for projection in 0..5u32 {
                    let mut hasher = std::collections::hash_map::DefaultHasher::new();
                    token_id.wrapping_add(projection * 1000).hash(&mut hasher);
                    let hash = hasher.finish();

                    for j in 0..20 {
                        let dim = ((hash as usize)
                            .wrapping_add(j * 19)
                            .wrapping_add(i * 17))
                            % EMBEDDING_DIM;
                        let value = ((hash >> (j * 3)) & 0x7) as f32 / 8.0 - 0.5;
                        embedding[dim] += value * (1.0 / (i as f32 + 1.0).sqrt());
                    }
                }

                // Positional weighting: earlier tokens carry slightly more signal
                let pos_weight = 1.0 - (i as f32 / valid_tokens.len() as f32) * 0.1;
                for k in 0..10 {
                    let dim = (token_id as usize * 7 + k * 13) % EMBEDDING_DIM;
                    embedding[dim] += (token_id as f32 / 30000.0) * pos_weight;
                }
            }

            // Sequence length normalization
            let seq_norm = 1.0 / (valid_tokens.len() as f32).sqrt();
            for val in &mut embedding {
                *val *= seq_norm;
            }
        }

        if self.config.normalize {
            Ok(normalize_embedding(embedding))
        } else {
            Ok(embedding)
        }
    }

    /// Clear the embedding cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Get model configuration
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Check if real tokenizer is loaded
    pub fn has_tokenizer(&self) -> bool {
        self.text_processor.has_tokenizer()
    }

    /// Whether a real tokenizer is loaded and ready
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }
}

impl TextEmbedder for EmbeddingModel {
    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.encode_batch(texts)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Normalize embedding to unit length
fn normalize_embedding(mut embedding: Embedding) -> Embedding {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for val in &mut embedding {
            *val /= norm;
        }
    }
    embedding
}
