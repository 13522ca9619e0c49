//! Data models for transcripts.

use serde::{Deserialize, Serialize};

/// A complete transcript for one video. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Individual caption segments with timestamps.
    pub segments: Vec<TranscriptSegment>,
    /// Segment texts joined with single spaces.
    pub full_text: String,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(video_id: String, segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id,
            segments,
            full_text,
        }
    }

    /// Create a transcript from raw text with no timing information.
    pub fn from_text(video_id: String, text: &str) -> Self {
        Self {
            video_id,
            segments: vec![TranscriptSegment::new(text.to_string(), 0.0, 0.0)],
            full_text: text.to_string(),
        }
    }

    /// The first `max_chars` characters, with `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.full_text.chars().count() <= max_chars {
            self.full_text.clone()
        } else {
            let cut: String = self.full_text.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty()
    }
}

/// A single caption segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Duration in seconds.
    pub duration_seconds: f64,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(text: String, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            text,
            start_seconds,
            duration_seconds,
        }
    }
}
