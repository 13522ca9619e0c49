//! Retrieval-augmented question answering over one video's transcript.
//!
//! A [`Retriever`] picks the passages most relevant to a question, the
//! [`PromptComposer`] lays them out with the grounding rules, and the
//! [`QaEngine`] ties both to a generator and the session history.

mod engine;
mod keyword;
mod prompt;
mod retriever;

pub use engine::{Answer, QaEngine};
pub use keyword::KeywordRetriever;
pub use prompt::PromptComposer;
pub use retriever::EmbeddingRetriever;

use crate::chunking::Passage;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A passage picked for a query, with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Trait for passage retrieval strategies.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `k` passages of the session, best first.
    ///
    /// Equal scores are ordered by ascending passage index, so the same query
    /// against the same session always yields the same result.
    async fn retrieve(
        &self,
        query: &str,
        session: &Session,
        k: usize,
    ) -> Result<Vec<RetrievedPassage>>;
}

/// How passages are selected for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    /// Cosine similarity over passage embeddings.
    #[default]
    Embedding,
    /// Word overlap, no provider calls.
    Keyword,
}

impl std::str::FromStr for RetrievalStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "embedding" => Ok(RetrievalStrategy::Embedding),
            "keyword" => Ok(RetrievalStrategy::Keyword),
            _ => Err(format!("Unknown retrieval strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalStrategy::Embedding => write!(f, "embedding"),
            RetrievalStrategy::Keyword => write!(f, "keyword"),
        }
    }
}

/// Create a retriever for the given strategy.
pub fn create_retriever(
    strategy: RetrievalStrategy,
    embedder: Arc<dyn Embedder>,
) -> Arc<dyn Retriever> {
    match strategy {
        RetrievalStrategy::Embedding => Arc::new(EmbeddingRetriever::new(embedder)),
        RetrievalStrategy::Keyword => Arc::new(KeywordRetriever::new()),
    }
}
