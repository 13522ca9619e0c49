//! Transcript providers.
//!
//! The pipeline only consumes the [`TranscriptProvider`] trait. `YtDlpProvider`
//! fetches captions from YouTube; `StaticProvider` serves text handed in directly.

mod models;
mod static_provider;
mod ytdlp;

pub use models::{Transcript, TranscriptSegment};
pub use static_provider::StaticProvider;
pub use ytdlp::YtDlpProvider;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the ordered caption segments for a video.
    ///
    /// Fails with `TranscriptUnavailable` when captions are disabled or missing,
    /// and with `Provider` when the source itself fails.
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;
}
