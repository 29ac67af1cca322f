//! End-to-end tests for the semantic chunking pipeline
//!
//! These tests drive the public `create_chunks` operation with an injected
//! deterministic embedder so clustering outcomes are fully controlled, while
//! the real DBSCAN clusterer and tokenizer-fallback token counting run
//! underneath.

use semchunk_rs::ml::text::{TextConfig, TextProcessor};
use semchunk_rs::ml::{DbscanClusterer, Embedding, TextEmbedder};
use semchunk_rs::{Config, ParagraphExtractor, Result, SemChunkError, SemanticChunker, PARAGRAPH_SEPARATOR};
use std::collections::HashMap;

/// Embedder backed by a fixed text -> vector table
struct TableEmbedder {
    table: HashMap<String, Embedding>,
}

impl TableEmbedder {
    fn new(entries: Vec<(String, Embedding)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }
}

impl TextEmbedder for TableEmbedder {
    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
        texts
            .iter()
            .map(|text| {
                self.table
                    .get(text)
                    .cloned()
                    .ok_or_else(|| SemChunkError::Embedding(format!("no test vector for: {}", text)))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        2
    }
}

fn build_chunker(config: Config, entries: Vec<(String, Embedding)>) -> SemanticChunker {
    let epsilon = config.clustering.epsilon;
    SemanticChunker::with_collaborators(
        config,
        Box::new(TableEmbedder::new(entries)),
        Box::new(TextProcessor::new(TextConfig::default())),
        Box::new(DbscanClusterer::new(epsilon)),
    )
}

/// A paragraph of `count` distinct words derived from `stem`
fn paragraph(stem: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{}{}", stem, i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Paragraph multiset recovered by splitting every chunk on the separator
fn paragraphs_of(chunks: &[String]) -> Vec<String> {
    let mut all: Vec<String> = chunks
        .iter()
        .flat_map(|chunk| chunk.split(PARAGRAPH_SEPARATOR).map(str::to_string))
        .collect();
    all.sort();
    all
}

#[test]
fn scenario_a_short_line_yields_no_chunks() {
    let mut chunker = build_chunker(Config::default(), vec![]);
    let chunks = chunker.create_chunks("only five words in here").unwrap();
    assert!(chunks.is_empty());
}

#[test]
fn scenario_b_single_paragraph_returned_verbatim() {
    let mut chunker = build_chunker(Config::default(), vec![]);
    let text = paragraph("solo", 12);
    let chunks = chunker.create_chunks(&text).unwrap();
    assert_eq!(chunks, vec![text]);
}

#[test]
fn scenario_c_cluster_plus_two_noise_orphans() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;

    // 8 tightly related paragraphs and 2 mutually unrelated singletons
    let related: Vec<String> = (0..8).map(|i| paragraph(&format!("topic{}", i), 12)).collect();
    let orphan_a = paragraph("granite", 12);
    let orphan_b = paragraph("saxophone", 12);

    let mut entries: Vec<(String, Embedding)> = related
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), vec![0.01 * i as f32, 0.0]))
        .collect();
    entries.push((orphan_a.clone(), vec![10.0, 10.0]));
    entries.push((orphan_b.clone(), vec![-10.0, -10.0]));

    let mut input: Vec<String> = related.clone();
    input.push(orphan_a.clone());
    input.push(orphan_b.clone());
    let text = input.join("\n");

    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    // 8 x 12 words fit one 300-token chunk; the orphans, still noise after
    // the relaxed re-pass, come back as two standalone chunks.
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], related.join(PARAGRAPH_SEPARATOR));
    assert!(chunks.contains(&orphan_a));
    assert!(chunks.contains(&orphan_b));
}

#[test]
fn scenario_d_budget_split_preserves_order() {
    let mut config = Config::default();
    config.chunking.max_tokens = 50;

    let p1 = paragraph("alpha", 20);
    let p2 = paragraph("bravo", 20);
    let p3 = paragraph("charlie", 20);

    let entries = vec![
        (p1.clone(), vec![0.0, 0.0]),
        (p2.clone(), vec![0.1, 0.0]),
        (p3.clone(), vec![0.0, 0.1]),
    ];

    let text = format!("{}\n{}\n{}", p1, p2, p3);
    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    // [20, 20, 20] against a 50-token budget: [p1+p2] then [p3]
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], format!("{}{}{}", p1, PARAGRAPH_SEPARATOR, p2));
    assert_eq!(chunks[1], p3);
}

#[test]
fn coverage_no_paragraph_lost_or_duplicated() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;
    config.chunking.max_tokens = 40;

    // Two clusters of 3 plus 2 noise points
    let cluster_a: Vec<String> = (0..3).map(|i| paragraph(&format!("ocean{}", i), 15)).collect();
    let cluster_b: Vec<String> = (0..3).map(|i| paragraph(&format!("fiscal{}", i), 15)).collect();
    let noise_a = paragraph("meteor", 15);
    let noise_b = paragraph("violin", 15);

    let mut entries: Vec<(String, Embedding)> = Vec::new();
    for (i, p) in cluster_a.iter().enumerate() {
        entries.push((p.clone(), vec![0.01 * i as f32, 0.0]));
    }
    for (i, p) in cluster_b.iter().enumerate() {
        entries.push((p.clone(), vec![5.0 + 0.01 * i as f32, 5.0]));
    }
    entries.push((noise_a.clone(), vec![50.0, 50.0]));
    entries.push((noise_b.clone(), vec![-50.0, -50.0]));

    let mut input: Vec<String> = Vec::new();
    input.extend(cluster_a.clone());
    input.push(noise_a.clone());
    input.extend(cluster_b.clone());
    input.push(noise_b.clone());
    let text = input.join("\n");

    let extractor = ParagraphExtractor::default();
    let mut expected = extractor.extract(&text);
    expected.sort();

    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    assert_eq!(paragraphs_of(&chunks), expected);
}

#[test]
fn budget_bound_holds_for_multi_paragraph_chunks() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;
    config.chunking.max_tokens = 35;

    // One cluster of 5 paragraphs, 15 words each: packer must split
    let members: Vec<String> = (0..5).map(|i| paragraph(&format!("glacier{}", i), 15)).collect();
    let entries: Vec<(String, Embedding)> = members
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), vec![0.01 * i as f32, 0.0]))
        .collect();

    let text = members.join("\n");
    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        let parts: Vec<&str> = chunk.split(PARAGRAPH_SEPARATOR).collect();
        if parts.len() > 1 {
            let tokens: usize = parts.iter().map(|p| p.split_whitespace().count()).sum();
            assert!(
                tokens <= 35,
                "multi-paragraph chunk exceeds budget: {} tokens",
                tokens
            );
        }
    }
}

#[test]
fn no_chunk_mixes_two_clusters() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;

    let cluster_a: Vec<String> = (0..3).map(|i| paragraph(&format!("reef{}", i), 12)).collect();
    let cluster_b: Vec<String> = (0..3).map(|i| paragraph(&format!("bond{}", i), 12)).collect();

    let mut entries: Vec<(String, Embedding)> = Vec::new();
    for (i, p) in cluster_a.iter().enumerate() {
        entries.push((p.clone(), vec![0.01 * i as f32, 0.0]));
    }
    for (i, p) in cluster_b.iter().enumerate() {
        entries.push((p.clone(), vec![9.0 + 0.01 * i as f32, 9.0]));
    }

    // Interleave the two topics in document order
    let text = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        cluster_a[0], cluster_b[0], cluster_a[1], cluster_b[1], cluster_a[2], cluster_b[2]
    );

    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    for chunk in &chunks {
        let in_a = chunk.split(PARAGRAPH_SEPARATOR).any(|p| cluster_a.iter().any(|m| m == p));
        let in_b = chunk.split(PARAGRAPH_SEPARATOR).any(|p| cluster_b.iter().any(|m| m == p));
        assert!(!(in_a && in_b), "chunk mixes paragraphs from two clusters");
    }

    // Paragraph order inside each chunk follows document order
    assert_eq!(chunks[0], cluster_a.join(PARAGRAPH_SEPARATOR));
    assert_eq!(chunks[1], cluster_b.join(PARAGRAPH_SEPARATOR));
}

#[test]
fn oversized_paragraph_survives_whole() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;
    config.chunking.max_tokens = 60;

    let small = paragraph("brook", 12);
    let huge = paragraph("tome", 200); // far over the 60-token budget
    let tail = paragraph("delta", 12);

    let entries = vec![
        (small.clone(), vec![0.0, 0.0]),
        (huge.clone(), vec![0.1, 0.0]),
        (tail.clone(), vec![0.0, 0.1]),
    ];

    let text = format!("{}\n{}\n{}", small, huge, tail);
    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    // Never truncated, never dropped: the oversized paragraph is its own chunk
    assert!(chunks.iter().any(|c| c == &huge));
    let extractor = ParagraphExtractor::default();
    let mut expected = extractor.extract(&text);
    expected.sort();
    assert_eq!(paragraphs_of(&chunks), expected);
}

#[test]
fn single_orphan_after_clustering_becomes_standalone_chunk() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;

    let members: Vec<String> = (0..3).map(|i| paragraph(&format!("lagoon{}", i), 12)).collect();
    let lone = paragraph("obelisk", 12);

    let mut entries: Vec<(String, Embedding)> = members
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), vec![0.01 * i as f32, 0.0]))
        .collect();
    entries.push((lone.clone(), vec![40.0, 40.0]));

    let text = format!("{}\n{}", members.join("\n"), lone);
    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    // One orphan: promoted directly, no re-clustering attempted
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], members.join(PARAGRAPH_SEPARATOR));
    assert_eq!(chunks[1], lone);
}

#[test]
fn orphan_repass_can_form_relaxed_cluster() {
    let mut config = Config::default();
    config.clustering.epsilon = 0.5;

    // A main cluster of 3 plus 2 orphans that are close to each other but
    // below the first-pass minimum of 3; the relaxed pass (minimum 2) should
    // cluster them together into one chunk.
    let members: Vec<String> = (0..3).map(|i| paragraph(&format!("basalt{}", i), 12)).collect();
    let pair_a = paragraph("willow", 12);
    let pair_b = paragraph("wicker", 12);

    let mut entries: Vec<(String, Embedding)> = members
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), vec![0.01 * i as f32, 0.0]))
        .collect();
    entries.push((pair_a.clone(), vec![20.0, 20.0]));
    entries.push((pair_b.clone(), vec![20.1, 20.0]));

    let text = format!("{}\n{}\n{}", members.join("\n"), pair_a, pair_b);
    let mut chunker = build_chunker(config, entries);
    let chunks = chunker.create_chunks(&text).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], members.join(PARAGRAPH_SEPARATOR));
    assert_eq!(chunks[1], format!("{}{}{}", pair_a, PARAGRAPH_SEPARATOR, pair_b));
}

#[test]
fn default_pipeline_runs_offline_end_to_end() {
    // The stock collaborators (token-feature embedder, fallback counting,
    // DBSCAN) must work without any downloaded model files.
    let mut chunker = SemanticChunker::new(None).unwrap();

    let text = "\
the first paragraph talks about rivers lakes rainfall and general hydrology topics at length\n\
the second paragraph talks about rivers lakes rainfall and regional hydrology measurements in detail\n\
short line\n\
the third paragraph covers corporate earnings revenue margins and quarterly guidance for investors\n";

    let chunks = chunker.create_chunks(text).unwrap();

    // Whatever the clustering outcome, coverage must hold
    let extractor = ParagraphExtractor::default();
    let mut expected = extractor.extract(text);
    expected.sort();
    assert_eq!(paragraphs_of(&chunks), expected);
    assert!(!chunks.is_empty());
}
