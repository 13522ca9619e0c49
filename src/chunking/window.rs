//! Fixed-size window chunking with character overlap.

use super::{char_boundaries, Chunker, ChunkingConfig};
use crate::error::Result;

/// Sliding-window chunker.
///
/// Passages start every `max_size - overlap` characters, so each passage after
/// the first repeats the trailing `overlap` characters of its predecessor.
pub struct WindowChunker;

impl WindowChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for WindowChunker {
    fn chunk<'a>(&self, text: &'a str, config: &ChunkingConfig) -> Result<Vec<&'a str>> {
        config.validate()?;
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let bounds = char_boundaries(text);
        let total = bounds.len() - 1;
        let step = config.max_size - config.overlap;

        let mut passages = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + config.max_size).min(total);
            passages.push(&text[bounds[start]..bounds[end]]);
            if end == total {
                break;
            }
            start += step;
        }

        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::stitch;

    fn chunk(text: &str, max_size: usize, overlap: usize) -> Vec<&str> {
        let config = ChunkingConfig::new(max_size, overlap).unwrap();
        WindowChunker::new().chunk(text, &config).unwrap()
    }

    #[test]
    fn test_windows_repeat_overlap() {
        let passages = chunk("abcdefghij", 6, 2);
        assert_eq!(passages, vec!["abcdef", "efghij"]);
    }

    #[test]
    fn test_every_passage_repeats_predecessor_tail() {
        let text = "The quick brown fox jumps over the lazy dog again and again.";
        let passages = chunk(text, 12, 4);
        for pair in passages.windows(2) {
            let prev_tail: String = pair[0].chars().skip(pair[0].chars().count() - 4).collect();
            let next_head: String = pair[1].chars().take(4).collect();
            assert_eq!(prev_tail, next_head);
        }
        assert_eq!(stitch(&passages, 4), text);
    }

    #[test]
    fn test_short_text_single_window() {
        assert_eq!(chunk("short", 100, 10), vec!["short"]);
    }

    #[test]
    fn test_reconstruction_grid() {
        let text = "Zwölf Boxkämpfer jagen Viktor quer über den großen Sylter Deich.";
        for (max_size, overlap) in [(1, 0), (3, 1), (8, 7), (10, 3), (64, 0), (200, 50)] {
            let passages = chunk(text, max_size, overlap);
            assert!(passages.iter().all(|p| p.chars().count() <= max_size));
            assert!(passages.iter().all(|p| !p.is_empty()));
            assert_eq!(stitch(&passages, overlap), text, "({}, {})", max_size, overlap);
        }
    }
}
