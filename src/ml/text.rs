//! Text preprocessing, tokenization, and token counting
//!
//! This module wraps a HuggingFace tokenizer for the two places the pipeline
//! needs one: producing token IDs for the embedding model and counting tokens
//! for the chunk packer's budget. A whitespace word-count fallback keeps both
//! paths working when no tokenizer file is loaded.

use crate::error::{Result, SemChunkError};
use crate::ml::TokenCounter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokenizers::Tokenizer;
use unicode_normalization::UnicodeNormalization;

/// Text preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Maximum sequence length
    pub max_length: usize,
    /// Whether to truncate long sequences
    pub truncate: bool,
    /// Whether to add special tokens (CLS, SEP) when tokenizing for inference
    pub add_special_tokens: bool,
    /// Whether to normalize unicode
    pub normalize_unicode: bool,
    /// Whether to lowercase text
    pub lowercase: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_length: 512,
            truncate: true,
            add_special_tokens: true,
            normalize_unicode: true,
            lowercase: false, // SentenceTransformers typically preserve case
        }
    }
}

/// Tokenized text ready for model inference
#[derive(Debug, Clone)]
pub struct TokenizedText {
    /// Token IDs
    pub input_ids: Vec<u32>,
    /// Attention mask (1 for real tokens, 0 for padding)
    pub attention_mask: Vec<u32>,
    /// Original text length before processing
    pub original_length: usize,
}

/// Text preprocessor, tokenizer, and token counter
pub struct TextProcessor {
    /// Tokenizer instance
    tokenizer: Option<Tokenizer>,
    /// Configuration
    config: TextConfig,
}

impl TextProcessor {
    /// Create new text processor
    pub fn new(config: TextConfig) -> Self {
        Self {
            tokenizer: None,
            config,
        }
    }

    /// Load tokenizer from a model directory containing `tokenizer.json`
    pub fn load_tokenizer<P: AsRef<Path>>(&mut self, model_dir: P) -> Result<()> {
        let tokenizer_path = model_dir.as_ref().join("tokenizer.json");

        if !tokenizer_path.exists() {
            log::warn!("Tokenizer file not found at {:?}", tokenizer_path);
            return Err(SemChunkError::Tokenizer(
                "Tokenizer file not found".to_string(),
            ));
        }

        match Tokenizer::from_file(&tokenizer_path) {
            Ok(tokenizer) => {
                self.tokenizer = Some(tokenizer);
                log::info!("Loaded tokenizer from {:?}", tokenizer_path);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load tokenizer from {:?}: {}", tokenizer_path, e);
                Err(SemChunkError::Tokenizer(format!(
                    "Failed to load tokenizer: {}",
                    e
                )))
            }
        }
    }

    /// Preprocess text (normalize, clean, etc.)
    pub fn preprocess_text(&self, text: &str) -> String {
        let mut processed = text.to_string();

        // Unicode normalization
        if self.config.normalize_unicode {
            processed = processed.nfc().collect::<String>();
        }

        if self.config.lowercase {
            processed = processed.to_lowercase();
        }

        processed = processed.trim().to_string();

        // Collapse excessive whitespace
        processed = processed
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ");

        processed
    }

    /// Count the tokens the tokenizer produces for this text
    ///
    /// Counts exclude special tokens and padding; this is the budget measure
    /// the chunk packer works against. Falls back to whitespace word counting
    /// when no tokenizer is loaded.
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let preprocessed = self.preprocess_text(text);

        if let Some(ref tokenizer) = self.tokenizer {
            let encoding = tokenizer
                .encode(preprocessed, false)
                .map_err(|e| SemChunkError::Tokenizer(format!("Tokenization failed: {}", e)))?;
            Ok(encoding.get_ids().len())
        } else {
            Ok(preprocessed.split_whitespace().count())
        }
    }

    /// Tokenize text for model inference
    pub fn tokenize(&self, text: &str) -> Result<TokenizedText> {
        let preprocessed = self.preprocess_text(text);
        let original_length = text.len();

        if let Some(ref tokenizer) = self.tokenizer {
            let encoding = tokenizer
                .encode(preprocessed, self.config.add_special_tokens)
                .map_err(|e| SemChunkError::Tokenizer(format!("Tokenization failed: {}", e)))?;

            let input_ids = encoding.get_ids().to_vec();
            let attention_mask = encoding.get_attention_mask().to_vec();

            let (input_ids, attention_mask) = self.pad_or_truncate(input_ids, attention_mask);

            Ok(TokenizedText {
                input_ids,
                attention_mask,
                original_length,
            })
        } else {
            self.fallback_tokenize(&preprocessed, original_length)
        }
    }

    /// Tokenize multiple texts in batch
    pub fn tokenize_batch(&self, texts: &[String]) -> Result<Vec<TokenizedText>> {
        let mut results = Vec::new();

        if let Some(ref tokenizer) = self.tokenizer {
            let preprocessed: Vec<String> = texts
                .iter()
                .map(|text| self.preprocess_text(text))
                .collect();

            let encodings = tokenizer
                .encode_batch(preprocessed, self.config.add_special_tokens)
                .map_err(|e| {
                    SemChunkError::Tokenizer(format!("Batch tokenization failed: {}", e))
                })?;

            for (encoding, original_text) in encodings.iter().zip(texts.iter()) {
                let input_ids = encoding.get_ids().to_vec();
                let attention_mask = encoding.get_attention_mask().to_vec();

                let (input_ids, attention_mask) = self.pad_or_truncate(input_ids, attention_mask);

                results.push(TokenizedText {
                    input_ids,
                    attention_mask,
                    original_length: original_text.len(),
                });
            }
        } else {
            for text in texts {
                results.push(self.tokenize(text)?);
            }
        }

        Ok(results)
    }

    /// Pad or truncate sequences to max_length
    fn pad_or_truncate(
        &self,
        mut input_ids: Vec<u32>,
        mut attention_mask: Vec<u32>,
    ) -> (Vec<u32>, Vec<u32>) {
        let max_len = self.config.max_length;

        if input_ids.len() > max_len && self.config.truncate {
            input_ids.truncate(max_len);
            attention_mask.truncate(max_len);
        } else if input_ids.len() < max_len {
            let pad_len = max_len - input_ids.len();
            input_ids.extend(vec![0; pad_len]); // 0 is typically PAD token
            attention_mask.extend(vec![0; pad_len]);
        }

        (input_ids, attention_mask)
    }

    /// Fallback tokenization when no real tokenizer is available
    fn fallback_tokenize(&self, text: &str, original_length: usize) -> Result<TokenizedText> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut input_ids = Vec::new();

        if self.config.add_special_tokens {
            input_ids.push(101); // [CLS]
        }

        // Hash-based word IDs, kept in a BERT-like vocabulary range
        let word_budget = self.config.max_length.saturating_sub(2);
        for word in words.iter().take(word_budget) {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            use std::hash::{Hash, Hasher};
            word.hash(&mut hasher);
            let token_id = (hasher.finish() % 30000 + 1000) as u32;
            input_ids.push(token_id);
        }

        if self.config.add_special_tokens {
            input_ids.push(102); // [SEP]
        }

        let seq_len = input_ids.len();
        let attention_mask = vec![1u32; seq_len];

        let (input_ids, attention_mask) = self.pad_or_truncate(input_ids, attention_mask);

        log::debug!(
            "Fallback tokenization: {} words -> {} tokens",
            words.len(),
            seq_len
        );

        Ok(TokenizedText {
            input_ids,
            attention_mask,
            original_length,
        })
    }

    /// Get tokenizer vocabulary size
    pub fn vocab_size(&self) -> Option<usize> {
        self.tokenizer.as_ref().map(|t| t.get_vocab_size(false))
    }

    /// Get configuration
    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Check if real tokenizer is loaded
    pub fn has_tokenizer(&self) -> bool {
        self.tokenizer.is_some()
    }
}

impl TokenCounter for TextProcessor {
    fn token_count(&mut self, text: &str) -> Result<usize> {
        self.count_tokens(text)
    }
}
