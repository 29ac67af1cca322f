//! Paragraph extraction from raw text
//!
//! Splits input text into candidate paragraphs on line breaks and filters
//! out short noise lines (headers, captions, page furniture) by word count.

/// Extracts candidate paragraphs from raw text
///
/// Single newlines count as paragraph boundaries; blank-line grouping is not
/// applied. Each surviving paragraph is the whitespace-trimmed line content.
#[derive(Debug, Clone)]
pub struct ParagraphExtractor {
    /// Lines with at most this many words are discarded
    min_words: usize,
}

impl ParagraphExtractor {
    /// Create a new extractor with the given minimum word count
    pub fn new(min_words: usize) -> Self {
        Self { min_words }
    }

    /// Extract the ordered sequence of candidate paragraphs from raw text
    ///
    /// Returns an empty vector when no line survives filtering; the pipeline
    /// short-circuits on that case.
    pub fn extract(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| line.split_whitespace().count() > self.min_words)
            .map(str::to_string)
            .collect()
    }

    /// Minimum word count below which lines are discarded
    pub fn min_words(&self) -> usize {
        self.min_words
    }
}

impl Default for ParagraphExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}
