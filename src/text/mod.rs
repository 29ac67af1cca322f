//! Text processing module for semchunk-rs
//!
//! This module provides paragraph extraction from raw text, the first stage
//! of the semantic chunking pipeline.

pub mod paragraph;

pub use paragraph::ParagraphExtractor;
