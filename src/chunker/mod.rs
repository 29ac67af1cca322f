//! Semantic chunking pipeline
//!
//! The pipeline runs three stages in strict forward order: paragraph
//! extraction, semantic grouping (embed + density-cluster + orphan handling),
//! and token-budgeted chunk packing. Paragraphs the clusterer labels as noise
//! get exactly one relaxed re-clustering pass; there is never a third pass.

use crate::config::Config;
use crate::error::{Result, SemChunkError};
use crate::ml::embedding::EmbeddingModel;
use crate::ml::text::{TextConfig, TextProcessor};
use crate::ml::{Clusterer, DbscanClusterer, TextEmbedder, TokenCounter, NOISE_LABEL};
use crate::text::ParagraphExtractor;

/// Separator joining paragraphs inside one chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Semantic chunker: groups paragraphs by embedding similarity and packs
/// them into token-budgeted chunks
///
/// The embedding, token counting, and clustering collaborators are injected
/// behind trait objects; [`SemanticChunker::new`] wires up the crate's
/// default implementations.
pub struct SemanticChunker {
    config: Config,
    extractor: ParagraphExtractor,
    embedder: Box<dyn TextEmbedder>,
    token_counter: Box<dyn TokenCounter>,
    clusterer: Box<dyn Clusterer>,
}

impl SemanticChunker {
    /// Create a chunker with the default collaborators
    ///
    /// Does not touch the network; the default embedder and token counter run
    /// on their fallback tokenization until a tokenizer is loaded explicitly.
    pub fn new(config: Option<Config>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let embedder = EmbeddingModel::new(config.embedding.clone())?;
        let token_counter = TextProcessor::new(TextConfig {
            max_length: config.embedding.max_length,
            ..Default::default()
        });
        let clusterer = DbscanClusterer::new(config.clustering.epsilon);

        Ok(Self::with_collaborators(
            config,
            Box::new(embedder),
            Box::new(token_counter),
            Box::new(clusterer),
        ))
    }

    /// Create a chunker with injected collaborators
    pub fn with_collaborators(
        config: Config,
        embedder: Box<dyn TextEmbedder>,
        token_counter: Box<dyn TokenCounter>,
        clusterer: Box<dyn Clusterer>,
    ) -> Self {
        let extractor = ParagraphExtractor::new(config.chunking.min_paragraph_words);
        Self {
            config,
            extractor,
            embedder,
            token_counter,
            clusterer,
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split raw text into topically coherent, token-budgeted chunks
    ///
    /// Every extracted paragraph appears in exactly one returned chunk; a
    /// chunk never mixes paragraphs from different clusters. Degenerate
    /// inputs (empty text, everything filtered out) yield an empty list.
    pub fn create_chunks(&mut self, text: &str) -> Result<Vec<String>> {
        let paragraphs = self.extractor.extract(text);
        if paragraphs.is_empty() {
            log::info!("No paragraphs survived filtering, returning empty chunk list");
            return Ok(Vec::new());
        }
        log::info!("Extracted {} candidate paragraphs", paragraphs.len());

        let min_cluster_size = self.config.chunking.min_cluster_size;
        let (mut chunks, orphans) = self.cluster_and_pack(&paragraphs, min_cluster_size)?;
        log::debug!(
            "First pass: {} chunks, {} orphan paragraphs",
            chunks.len(),
            orphans.len()
        );

        if orphans.len() > 1 {
            // One relaxed re-pass over the orphans, never more.
            let orphan_cluster_size = self.config.chunking.orphan_cluster_size;
            let (orphan_chunks, single_orphans) =
                self.cluster_and_pack(&orphans, orphan_cluster_size)?;
            log::debug!(
                "Orphan pass: {} chunks, {} standalone paragraphs",
                orphan_chunks.len(),
                single_orphans.len()
            );
            chunks.extend(orphan_chunks);
            chunks.extend(single_orphans);
        } else {
            // A lone orphan becomes a standalone chunk as-is.
            chunks.extend(orphans);
        }

        log::info!("Produced {} chunks", chunks.len());
        Ok(chunks)
    }

    /// Embed, cluster, and pack one set of paragraphs
    ///
    /// Returns finished chunks from confidently-clustered paragraphs plus the
    /// noise-labeled orphans. A single paragraph is returned as an orphan so
    /// the caller decides its fate; clustering needs at least two points.
    fn cluster_and_pack(
        &mut self,
        paragraphs: &[String],
        min_cluster_size: usize,
    ) -> Result<(Vec<String>, Vec<String>)> {
        if paragraphs.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        if paragraphs.len() == 1 {
            return Ok((Vec::new(), paragraphs.to_vec()));
        }

        let embeddings = self.embedder.embed_batch(paragraphs)?;
        if embeddings.len() != paragraphs.len() {
            return Err(SemChunkError::Embedding(format!(
                "embedder returned {} vectors for {} paragraphs",
                embeddings.len(),
                paragraphs.len()
            )));
        }

        let labels = self.clusterer.cluster(&embeddings, min_cluster_size)?;
        if labels.len() != paragraphs.len() {
            return Err(SemChunkError::Clustering(format!(
                "clusterer returned {} labels for {} paragraphs",
                labels.len(),
                paragraphs.len()
            )));
        }

        // Group order follows first label appearance; member order follows
        // document order.
        let mut groups: Vec<(i64, Vec<&String>)> = Vec::new();
        let mut orphans: Vec<String> = Vec::new();
        for (paragraph, &label) in paragraphs.iter().zip(labels.iter()) {
            if label == NOISE_LABEL {
                orphans.push(paragraph.clone());
            } else if let Some((_, members)) = groups.iter_mut().find(|(l, _)| *l == label) {
                members.push(paragraph);
            } else {
                groups.push((label, vec![paragraph]));
            }
        }

        let mut chunks = Vec::new();
        for (_, members) in &groups {
            chunks.extend(self.pack_cluster(members)?);
        }

        Ok((chunks, orphans))
    }

    /// Greedily pack one cluster's paragraphs into token-budgeted chunks
    ///
    /// Single pass, order-preserving. A paragraph whose own token count
    /// exceeds the budget is never split; it becomes its own oversized chunk.
    fn pack_cluster(&mut self, paragraphs: &[&String]) -> Result<Vec<String>> {
        let max_tokens = self.config.chunking.max_tokens;

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_tokens = 0usize;

        for paragraph in paragraphs {
            let paragraph_tokens = self.token_counter.token_count(paragraph)?;

            if current_tokens + paragraph_tokens > max_tokens && !current.is_empty() {
                chunks.push(current.join(PARAGRAPH_SEPARATOR));
                current = vec![paragraph.as_str()];
                current_tokens = paragraph_tokens;
            } else {
                current.push(paragraph.as_str());
                current_tokens += paragraph_tokens;
            }
        }

        if !current.is_empty() {
            chunks.push(current.join(PARAGRAPH_SEPARATOR));
        }

        Ok(chunks)
    }
}
