//! Process-local session store.
//!
//! A session holds everything needed to answer questions about one video: its
//! transcript, passages, vector index and conversation history. Sessions are
//! keyed by video id and live until cleared or the process exits.

use crate::chunking::Passage;
use crate::error::{Result, TubechatError};
use crate::index::VectorIndex;
use crate::transcript::Transcript;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        }
    }
}

/// Everything known about one processed video.
///
/// The transcript, passages and index never change after construction. Only the
/// history grows, behind its own lock.
#[derive(Debug)]
pub struct Session {
    pub video_id: String,
    pub transcript: Transcript,
    pub passages: Vec<Passage>,
    pub index: VectorIndex,
    pub created_at: DateTime<Utc>,
    history: Mutex<Vec<Exchange>>,
}

impl Session {
    pub fn new(transcript: Transcript, passages: Vec<Passage>, index: VectorIndex) -> Self {
        Self {
            video_id: transcript.video_id.clone(),
            transcript,
            passages,
            index,
            created_at: Utc::now(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the conversation so far, oldest first.
    pub async fn history(&self) -> Vec<Exchange> {
        self.history.lock().await.clone()
    }

    /// Record an exchange at the end of the history.
    pub async fn record(&self, exchange: Exchange) {
        self.history.lock().await.push(exchange);
    }

    /// Forget the conversation, keeping transcript and index.
    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub fn passage(&self, index: usize) -> Option<&Passage> {
        self.passages.get(index)
    }
}

/// Listing entry for a stored session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub video_id: String,
    pub passages: usize,
    pub exchanges: usize,
    pub created_at: DateTime<Utc>,
}

/// Map of video id to session, shared by the orchestrator, the QA engine and the server.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, replacing any previous one for the same video.
    ///
    /// The replacement starts with an empty history. Callers still holding the
    /// old `Arc<Session>` keep working against the old index.
    pub async fn create_or_replace(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let replaced = self
            .sessions
            .write()
            .await
            .insert(session.video_id.clone(), Arc::clone(&session))
            .is_some();

        debug!(
            video_id = %session.video_id,
            replaced,
            "Stored session with {} passages",
            session.passages.len()
        );
        session
    }

    pub async fn get(&self, video_id: &str) -> Result<Arc<Session>> {
        self.sessions
            .read()
            .await
            .get(video_id)
            .cloned()
            .ok_or_else(|| TubechatError::SessionNotFound(video_id.to_string()))
    }

    pub async fn contains(&self, video_id: &str) -> bool {
        self.sessions.read().await.contains_key(video_id)
    }

    /// Append an exchange to a video's history.
    pub async fn append_exchange(&self, video_id: &str, question: &str, answer: &str) -> Result<()> {
        let session = self.get(video_id).await?;
        session.record(Exchange::new(question, answer)).await;
        Ok(())
    }

    /// History of a video, oldest first.
    pub async fn history(&self, video_id: &str) -> Result<Vec<Exchange>> {
        Ok(self.get(video_id).await?.history().await)
    }

    /// Start a fresh conversation for a video without rebuilding its session.
    pub async fn reset_history(&self, video_id: &str) -> Result<()> {
        self.get(video_id).await?.clear_history().await;
        Ok(())
    }

    /// Drop one session. Returns whether it existed.
    pub async fn clear(&self, video_id: &str) -> bool {
        self.sessions.write().await.remove(video_id).is_some()
    }

    /// Drop every session. Returns how many were removed.
    pub async fn clear_all(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }

    /// Summaries of all sessions, sorted by video id.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            summaries.push(SessionSummary {
                video_id: session.video_id.clone(),
                passages: session.passages.len(),
                exchanges: session.history_len().await,
                created_at: session.created_at,
            });
        }
        summaries.sort_by(|a, b| a.video_id.cmp(&b.video_id));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
