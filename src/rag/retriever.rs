//! Embedding-based retrieval.

use super::{RetrievedPassage, Retriever};
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use crate::index::is_finite;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ranks passages by cosine similarity between the query and passage embeddings.
pub struct EmbeddingRetriever {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingRetriever {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl Retriever for EmbeddingRetriever {
    #[instrument(skip(self, session), fields(video_id = %session.video_id))]
    async fn retrieve(
        &self,
        query: &str,
        session: &Session,
        k: usize,
    ) -> Result<Vec<RetrievedPassage>> {
        if session.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| TubechatError::RetrievalFailed(format!("query embedding failed: {}", e)))?;

        if query_embedding.len() != session.index.dimensions() {
            return Err(TubechatError::RetrievalFailed(format!(
                "query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                session.index.dimensions()
            )));
        }
        if !is_finite(&query_embedding) {
            return Err(TubechatError::RetrievalFailed(
                "query embedding has non-finite values".to_string(),
            ));
        }

        // The index normalizes the query itself.
        let hits = session.index.search(&query_embedding, k)?;
        debug!("Index returned {} hits", hits.len());

        hits.into_iter()
            .map(|(position, score)| {
                let passage = session.passage(position).ok_or_else(|| {
                    TubechatError::RetrievalFailed(format!(
                        "index position {} has no passage",
                        position
                    ))
                })?;
                Ok(RetrievedPassage {
                    passage: passage.clone(),
                    score,
                })
            })
            .collect()
    }
}
