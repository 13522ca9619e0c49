//! Sentence-aware chunking.
//!
//! Splits on sentence-ending punctuation and newlines, then packs sentences
//! greedily into passages.

use super::{split_by_chars, Chunker, ChunkingConfig};
use crate::error::Result;

/// Sentence-packing chunker.
pub struct SentenceChunker;

impl SentenceChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for SentenceChunker {
    fn chunk<'a>(&self, text: &'a str, config: &ChunkingConfig) -> Result<Vec<&'a str>> {
        config.validate()?;
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let max_size = config.max_size;
        let mut passages = Vec::new();

        // The buffer is always the slice text[buf_start..buf_end]
        let mut buf_start = 0;
        let mut buf_end = 0;
        let mut buf_chars = 0;
        let mut offset = 0;

        for sentence in split_sentences(text) {
            let s_start = offset;
            let s_end = offset + sentence.len();
            offset = s_end;
            let s_chars = sentence.chars().count();

            if buf_chars + s_chars <= max_size {
                if buf_chars == 0 {
                    buf_start = s_start;
                }
                buf_end = s_end;
                buf_chars += s_chars;
                continue;
            }

            if buf_chars > 0 {
                passages.push(&text[buf_start..buf_end]);
                buf_chars = 0;
            }

            if s_chars > max_size {
                passages.extend(split_by_chars(sentence, max_size));
            } else {
                buf_start = s_start;
                buf_end = s_end;
                buf_chars = s_chars;
            }
        }

        if buf_chars > 0 {
            passages.push(&text[buf_start..buf_end]);
        }

        Ok(passages)
    }
}

/// Split text into contiguous sentence slices.
///
/// A sentence ends after `.`, `?` or `!` plus the single whitespace character that
/// follows it, or after any newline. Concatenating the result yields `text`.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let end = if c == '\n' {
            Some(i + c.len_utf8())
        } else if matches!(c, '.' | '?' | '!') {
            match chars.peek() {
                Some(&(j, next)) if next.is_whitespace() => {
                    chars.next();
                    Some(j + next.len_utf8())
                }
                _ => None,
            }
        } else {
            None
        };

        if let Some(end) = end {
            sentences.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}
