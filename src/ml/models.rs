//! Model management for the embedding and tokenization collaborators
//!
//! Handles downloading and caching tokenizer files from the HuggingFace Hub.
//! Only tokenizer assets are fetched; the embedding model itself derives
//! vectors from token features and needs no weight files.

use crate::error::{Result, SemChunkError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Types of models supported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// Sentence transformer for embeddings
    SentenceTransformer,
    /// Custom models
    Custom(String),
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name/identifier
    pub name: String,
    /// Model type
    pub model_type: ModelType,
    /// Local path to model files
    pub local_path: Option<PathBuf>,
    /// HuggingFace model hub identifier
    pub hub_id: Option<String>,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Whether model files are cached locally
    pub cached: bool,
}

/// Model manager for downloading and caching tokenizer files
pub struct ModelManager {
    /// Cache directory for models
    cache_dir: PathBuf,
    /// Available models
    models: HashMap<String, ModelInfo>,
}

impl ModelManager {
    /// Create new model manager
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".cache")
                .join("semchunk-rs")
                .join("models")
        });

        std::fs::create_dir_all(&cache_dir)?;

        let mut manager = Self {
            cache_dir,
            models: HashMap::new(),
        };

        manager.register_default_models();

        Ok(manager)
    }

    /// Register default models
    fn register_default_models(&mut self) {
        let mini_lm = ModelInfo {
            name: "all-MiniLM-L6-v2".to_string(),
            model_type: ModelType::SentenceTransformer,
            local_path: None,
            hub_id: Some("sentence-transformers/all-MiniLM-L6-v2".to_string()),
            dimension: 384,
            max_length: 512,
            cached: false,
        };

        // Register with both short and full names for compatibility
        self.models
            .insert("all-MiniLM-L6-v2".to_string(), mini_lm.clone());
        self.models.insert(
            "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            mini_lm,
        );
    }

    /// Get model info by name
    pub fn get_model(&self, name: &str) -> Option<&ModelInfo> {
        self.models.get(name)
    }

    /// List available models
    pub fn list_models(&self) -> Vec<&ModelInfo> {
        self.models.values().collect()
    }

    /// Check if model is cached locally
    pub fn is_cached(&self, name: &str) -> bool {
        if let Some(model) = self.models.get(name) {
            model.cached && model.local_path.is_some()
        } else {
            false
        }
    }

    /// Get cache directory
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Download and cache tokenizer files from the HuggingFace Hub
    ///
    /// Returns the local model directory. Already-cached models are returned
    /// without touching the network.
    pub fn download_model(&mut self, name: &str) -> Result<PathBuf> {
        let model = self
            .models
            .get_mut(name)
            .ok_or_else(|| SemChunkError::Model(format!("Model '{}' not found", name)))?;

        if let Some(local_path) = &model.local_path {
            if local_path.exists() && Self::validate_model_files(local_path)? {
                log::info!("Model '{}' already cached at {:?}", name, local_path);
                return Ok(local_path.clone());
            }
        }

        let model_dir = self.cache_dir.join(name.replace('/', "--"));
        std::fs::create_dir_all(&model_dir)?;

        if let Some(hub_id) = &model.hub_id {
            log::info!(
                "Downloading tokenizer for '{}' from HuggingFace Hub: {}",
                name,
                hub_id
            );

            let files_to_download = vec![
                "tokenizer.json",
                "tokenizer_config.json",
                "vocab.txt", // For BERT-based tokenizers
            ];

            let mut downloaded_any = false;
            for file_name in files_to_download {
                match Self::download_file(hub_id, file_name, &model_dir) {
                    Ok(_) => {
                        downloaded_any = true;
                        log::debug!("Downloaded {}/{}", hub_id, file_name);
                    }
                    Err(e) => {
                        // Some files are optional, only warn
                        log::warn!("Failed to download {}/{}: {}", hub_id, file_name, e);
                    }
                }
            }

            if downloaded_any {
                log::info!("Successfully downloaded tokenizer files for '{}'", name);
                model.local_path = Some(model_dir.clone());
                model.cached = true;
            } else {
                log::error!("Failed to download any files for model '{}'", name);
                return Err(SemChunkError::Model(format!(
                    "Failed to download model '{}'",
                    name
                )));
            }
        } else {
            log::warn!("No HuggingFace Hub ID for model '{}', using local directory", name);
            model.local_path = Some(model_dir.clone());
            model.cached = true;
        }

        Ok(model_dir)
    }

    /// Download a single file from HuggingFace Hub
    fn download_file(repo_id: &str, filename: &str, target_dir: &Path) -> Result<()> {
        use hf_hub::api::sync::Api;

        let api = Api::new()
            .map_err(|e| SemChunkError::Model(format!("Failed to create HF API: {}", e)))?;

        let repo = api.model(repo_id.to_string());
        let target_path = target_dir.join(filename);

        // Skip if file already exists and is non-empty
        if target_path.exists() && target_path.metadata()?.len() > 0 {
            return Ok(());
        }

        match repo.get(filename) {
            Ok(downloaded_path) => {
                std::fs::copy(&downloaded_path, &target_path)
                    .map_err(|e| SemChunkError::Model(format!("Failed to copy file: {}", e)))?;
                log::debug!("Downloaded and copied {} to {:?}", filename, target_path);
                Ok(())
            }
            Err(e) => Err(SemChunkError::Model(format!(
                "Failed to download {}: {}",
                filename, e
            ))),
        }
    }

    /// Validate that essential tokenizer files exist
    fn validate_model_files(model_dir: &Path) -> Result<bool> {
        let file_path = model_dir.join("tokenizer.json");
        Ok(file_path.exists() && file_path.metadata()?.len() > 0)
    }

    /// Add custom model
    pub fn add_model(&mut self, model_info: ModelInfo) {
        self.models.insert(model_info.name.clone(), model_info);
    }

    /// Remove model from cache
    pub fn remove_model(&mut self, name: &str) -> Result<()> {
        if let Some(model) = self.models.get_mut(name) {
            if let Some(local_path) = &model.local_path {
                if local_path.exists() {
                    std::fs::remove_dir_all(local_path)?;
                }
            }
            model.local_path = None;
            model.cached = false;
        }
        Ok(())
    }
}
