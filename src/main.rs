//! semchunk-rs CLI application
//!
//! Command-line interface for the semchunk-rs library.

use clap::{Parser, Subcommand};
use semchunk_rs::ml::text::{TextConfig, TextProcessor};
use semchunk_rs::ml::{DbscanClusterer, EmbeddingModel};
use semchunk_rs::{Config, ParagraphExtractor, SemanticChunker};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "semchunk-rs")]
#[command(about = "Semantic text chunking: cluster paragraphs by similarity and pack them into token-budgeted chunks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a text file into semantic chunks
    Chunk {
        /// Input text file
        input: PathBuf,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum tokens per chunk
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Minimum cluster size for the first clustering pass
        #[arg(long)]
        min_cluster_size: Option<usize>,

        /// Relaxed minimum cluster size for the orphan re-pass
        #[arg(long)]
        orphan_cluster_size: Option<usize>,

        /// Skip tokenizer download and use the offline fallback
        #[arg(long)]
        offline: bool,

        /// Emit chunks as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show the paragraphs the extractor would feed into clustering
    Paragraphs {
        /// Input text file
        input: PathBuf,

        /// Lines with at most this many words are discarded
        #[arg(long, default_value = "10")]
        min_words: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chunk {
            input,
            config,
            max_tokens,
            min_cluster_size,
            orphan_cluster_size,
            offline,
            json,
        } => {
            chunk_command(
                input,
                config,
                max_tokens,
                min_cluster_size,
                orphan_cluster_size,
                offline,
                json,
            )?;
        }
        Commands::Paragraphs { input, min_words } => {
            paragraphs_command(input, min_words)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn chunk_command(
    input: PathBuf,
    config_path: Option<PathBuf>,
    max_tokens: Option<usize>,
    min_cluster_size: Option<usize>,
    orphan_cluster_size: Option<usize>,
    offline: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        eprintln!("❌ File not found: {}", input.display());
        return Ok(());
    }

    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(value) = max_tokens {
        config.chunking.max_tokens = value;
    }
    if let Some(value) = min_cluster_size {
        config.chunking.min_cluster_size = value;
    }
    if let Some(value) = orphan_cluster_size {
        config.chunking.orphan_cluster_size = value;
    }

    let mut embedder = EmbeddingModel::new(config.embedding.clone())?;
    let mut token_counter = TextProcessor::new(TextConfig {
        max_length: config.embedding.max_length,
        ..Default::default()
    });

    if offline {
        println!("📴 Offline mode: using fallback tokenization");
    } else {
        // Share the downloaded tokenizer between embedder and token counter
        match embedder.load_model() {
            Ok(model_dir) => {
                if let Err(e) = token_counter.load_tokenizer(&model_dir) {
                    eprintln!("⚠️  Tokenizer unavailable for counting, using fallback: {}", e);
                }
            }
            Err(e) => {
                eprintln!("⚠️  Model download failed, using fallback tokenization: {}", e);
            }
        }
    }

    let clusterer = DbscanClusterer::new(config.clustering.epsilon);
    let mut chunker = SemanticChunker::with_collaborators(
        config,
        Box::new(embedder),
        Box::new(token_counter),
        Box::new(clusterer),
    );

    println!("🧩 Chunking: {}", input.display());
    let text = std::fs::read_to_string(&input)?;
    let chunks = chunker.create_chunks(&text)?;

    if chunks.is_empty() {
        println!("❌ No paragraphs survived filtering, nothing to chunk");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
    } else {
        println!("✅ Produced {} chunks", chunks.len());
        println!();
        for (i, chunk) in chunks.iter().enumerate() {
            println!("── chunk {} ({} chars) ──", i + 1, chunk.len());
            println!("{}", chunk);
            println!();
        }
    }

    Ok(())
}

fn paragraphs_command(input: PathBuf, min_words: usize) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        eprintln!("❌ File not found: {}", input.display());
        return Ok(());
    }

    let text = std::fs::read_to_string(&input)?;
    let extractor = ParagraphExtractor::new(min_words);
    let paragraphs = extractor.extract(&text);

    if paragraphs.is_empty() {
        println!("❌ No paragraphs survived filtering");
        return Ok(());
    }

    println!("📄 {} paragraphs from {}", paragraphs.len(), input.display());
    println!();
    for (i, paragraph) in paragraphs.iter().enumerate() {
        println!("{}. {}", i + 1, paragraph);
    }

    Ok(())
}
