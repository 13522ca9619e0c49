//! Session builder.
//!
//! Turns a video reference into a ready-to-query session: resolve the id, get
//! the transcript, chunk it, embed the passages and build the index. A session
//! is only stored once every step succeeded.

use crate::chunking::{chunk_passages, ChunkingConfig, ChunkingMode};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, TubechatError};
use crate::index::VectorIndex;
use crate::rag::RetrievalStrategy;
use crate::session::{Session, SessionStore};
use crate::transcript::{Transcript, TranscriptProvider, YtDlpProvider};
use crate::video_ref::extract_video_id;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Characters of transcript shown back after processing.
pub const PREVIEW_CHARS: usize = 500;

/// Outcome of building a session.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub video_id: String,
    /// Number of passages indexed.
    pub passages: usize,
    /// Start of the transcript, `...`-terminated when cut.
    pub transcript_preview: String,
}

/// Builds sessions and stores them in the shared [`SessionStore`].
pub struct Orchestrator {
    provider: Arc<dyn TranscriptProvider>,
    embedder: Arc<dyn Embedder>,
    store: Arc<SessionStore>,
    chunking: ChunkingConfig,
    mode: ChunkingMode,
    strategy: RetrievalStrategy,
}

impl Orchestrator {
    /// Create an orchestrator with the yt-dlp provider and OpenAI embeddings.
    pub fn new(settings: &Settings, store: Arc<SessionStore>) -> Result<Self> {
        let provider = Arc::new(YtDlpProvider::new(
            settings.transcript.languages.clone(),
            settings.transcript.allow_generated,
        )?);

        let embedder = Arc::new(
            OpenAIEmbedder::with_config(
                &settings.embedding.model,
                settings.embedding.dimensions as usize,
            )?
            .with_max_concurrent(settings.embedding.max_concurrent),
        );

        Self::with_components(settings, provider, embedder, store)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        provider: Arc<dyn TranscriptProvider>,
        embedder: Arc<dyn Embedder>,
        store: Arc<SessionStore>,
    ) -> Result<Self> {
        let chunking =
            ChunkingConfig::new(settings.chunking.max_chars, settings.chunking.overlap_chars)?;

        Ok(Self {
            provider,
            embedder,
            store,
            chunking,
            mode: settings.chunking.mode,
            strategy: settings.retrieval.strategy,
        })
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    /// Fetch the transcript of a video and build its session.
    #[instrument(skip(self))]
    pub async fn process_video(&self, reference: &str) -> Result<ProcessResult> {
        let video_id = extract_video_id(reference)?;

        info!("Fetching transcript for {}", video_id);
        let segments = self.provider.fetch(&video_id).await?;
        let transcript = Transcript::new(video_id, segments);

        self.build_session(transcript).await
    }

    /// Build a session from transcript text supplied by the caller.
    #[instrument(skip(self, raw_text), fields(chars = raw_text.len()))]
    pub async fn ingest_transcript(&self, reference: &str, raw_text: &str) -> Result<ProcessResult> {
        let video_id = extract_video_id(reference)?;
        self.build_session(Transcript::from_text(video_id, raw_text)).await
    }

    async fn build_session(&self, transcript: Transcript) -> Result<ProcessResult> {
        if transcript.is_empty() {
            return Err(TubechatError::InvalidInput(format!(
                "transcript for {} is empty",
                transcript.video_id
            )));
        }

        let passages = chunk_passages(&transcript.full_text, &self.chunking, self.mode)?;
        info!("Created {} passages ({} mode)", passages.len(), self.mode);

        let index = match self.strategy {
            RetrievalStrategy::Embedding => {
                let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
                let vectors = self.embedder.embed_batch(&texts).await?;
                if vectors.len() != passages.len() {
                    return Err(TubechatError::Provider(format!(
                        "got {} embeddings for {} passages",
                        vectors.len(),
                        passages.len()
                    )));
                }
                let index = VectorIndex::build(vectors)?;
                debug!("Built index of {} vectors ({} dims)", index.len(), index.dimensions());
                index
            }
            RetrievalStrategy::Keyword => VectorIndex::empty(),
        };

        let result = ProcessResult {
            video_id: transcript.video_id.clone(),
            passages: passages.len(),
            transcript_preview: transcript.preview(PREVIEW_CHARS),
        };

        self.store
            .create_or_replace(Session::new(transcript, passages, index))
            .await;

        Ok(result)
    }
}
