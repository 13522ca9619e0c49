//! Transcript chunking for breaking long transcripts into searchable passages.
//!
//! Two explicit modes exist and the configured one always wins:
//!
//! - **Sentence** (default): packs whole sentences into passages; no overlap.
//! - **Window**: fixed character windows that repeat the trailing `overlap`
//!   characters of the previous passage.
//!
//! Sizes are counted in characters, never bytes. Every passage is an exact
//! slice of the input, so the non-overlapping parts of the output concatenate
//! back to the original text.

mod sentence;
mod window;

pub use sentence::SentenceChunker;
pub use window::WindowChunker;

use crate::error::{Result, TubechatError};
use serde::{Deserialize, Serialize};

/// A passage of transcript text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Zero-based position within the transcript's passage sequence.
    pub index: usize,
    /// Passage text, a contiguous slice of the transcript.
    pub text: String,
}

impl Passage {
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Shortened single-line preview for display.
    pub fn preview(&self, max_chars: usize) -> String {
        let flat = self.text.replace('\n', " ");
        let flat = flat.trim();
        if flat.chars().count() <= max_chars {
            flat.to_string()
        } else {
            let cut: String = flat.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}

/// Chunking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMode {
    /// Sentence-aware packing.
    #[default]
    Sentence,
    /// Fixed-size character windows with overlap.
    Window,
}

impl std::str::FromStr for ChunkingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentence" => Ok(ChunkingMode::Sentence),
            "window" => Ok(ChunkingMode::Window),
            _ => Err(format!("Unknown chunking mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingMode::Sentence => write!(f, "sentence"),
            ChunkingMode::Window => write!(f, "window"),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Maximum passage length in characters.
    pub max_size: usize,
    /// Characters shared between consecutive passages (window mode).
    pub overlap: usize,
}

impl ChunkingConfig {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        let config = Self { max_size, overlap };
        config.validate()?;
        Ok(config)
    }

    /// Enforce `max_size > overlap >= 0`.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 || self.overlap >= self.max_size {
            return Err(TubechatError::InvalidInput(format!(
                "chunk size ({}) must be greater than overlap ({})",
                self.max_size, self.overlap
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_size: 2000,
            overlap: 200,
        }
    }
}

/// Trait for transcript chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split text into ordered passages, each at most `config.max_size` characters.
    fn chunk<'a>(&self, text: &'a str, config: &ChunkingConfig) -> Result<Vec<&'a str>>;
}

/// Create a chunker for the given mode.
pub fn create_chunker(mode: ChunkingMode) -> Box<dyn Chunker> {
    match mode {
        ChunkingMode::Sentence => Box::new(SentenceChunker::new()),
        ChunkingMode::Window => Box::new(WindowChunker::new()),
    }
}

/// Chunk text into owned strings.
pub fn chunk(text: &str, max_size: usize, overlap: usize, mode: ChunkingMode) -> Result<Vec<String>> {
    let config = ChunkingConfig::new(max_size, overlap)?;
    let chunker = create_chunker(mode);
    Ok(chunker
        .chunk(text, &config)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Chunk text into indexed passages.
pub fn chunk_passages(text: &str, config: &ChunkingConfig, mode: ChunkingMode) -> Result<Vec<Passage>> {
    let chunker = create_chunker(mode);
    Ok(chunker
        .chunk(text, config)?
        .into_iter()
        .enumerate()
        .map(|(index, slice)| Passage::new(index, slice.to_string()))
        .collect())
}

/// Rebuild the source text from passages by dropping each passage's overlap prefix.
pub fn stitch<S: AsRef<str>>(passages: &[S], overlap: usize) -> String {
    let mut text = String::new();
    for (i, passage) in passages.iter().enumerate() {
        let passage = passage.as_ref();
        if i == 0 {
            text.push_str(passage);
        } else {
            text.extend(passage.chars().skip(overlap));
        }
    }
    text
}

/// Byte offsets of every character start, plus the total length.
pub(crate) fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Hard-split text into pieces of at most `max_size` characters.
pub(crate) fn split_by_chars(text: &str, max_size: usize) -> Vec<&str> {
    let bounds = char_boundaries(text);
    let total = bounds.len() - 1;
    (0..total)
        .step_by(max_size)
        .map(|start| {
            let end = (start + max_size).min(total);
            &text[bounds[start]..bounds[end]]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Sentence".parse::<ChunkingMode>().unwrap(), ChunkingMode::Sentence);
        assert_eq!("window".parse::<ChunkingMode>().unwrap(), ChunkingMode::Window);
        assert!("paragraph".parse::<ChunkingMode>().is_err());
    }

    #[test]
    fn test_config_rejects_overlap_not_below_size() {
        assert!(ChunkingConfig::new(10, 10).is_err());
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(10, 9).is_ok());
    }

    #[test]
    fn test_chunk_passages_indexes_in_order() {
        let config = ChunkingConfig::new(20, 0).unwrap();
        let passages = chunk_passages(
            "One sentence here. Another sentence there. A third one.",
            &config,
            ChunkingMode::Sentence,
        )
        .unwrap();

        assert!(passages.len() > 1);
        for (i, p) in passages.iter().enumerate() {
            assert_eq!(p.index, i);
            assert!(!p.text.is_empty());
        }
    }

    #[test]
    fn test_split_by_chars_respects_multibyte() {
        let pieces = split_by_chars("ééééé", 2);
        assert_eq!(pieces, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_passage_preview() {
        let passage = Passage::new(0, "line one\nline two".to_string());
        assert_eq!(passage.preview(100), "line one line two");
        assert_eq!(passage.preview(4), "line...");
    }
}
