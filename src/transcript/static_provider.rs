//! Provider that serves transcripts supplied up front.

use super::{TranscriptProvider, TranscriptSegment};
use crate::error::{Result, TranscriptIssue, TubechatError};
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory transcript provider keyed by video id.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    transcripts: HashMap<String, Vec<TranscriptSegment>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw transcript text for a video.
    pub fn with_text(mut self, video_id: &str, text: &str) -> Self {
        self.transcripts.insert(
            video_id.to_string(),
            vec![TranscriptSegment::new(text.to_string(), 0.0, 0.0)],
        );
        self
    }
}

#[async_trait]
impl TranscriptProvider for StaticProvider {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        self.transcripts
            .get(video_id)
            .cloned()
            .ok_or_else(|| TubechatError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                issue: TranscriptIssue::NotFound,
            })
    }
}
