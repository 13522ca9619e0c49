//! Keyword-overlap retrieval.
//!
//! Used when embeddings are disabled or the embedding provider is down. It needs
//! nothing but the passage text.

use super::{RetrievedPassage, Retriever};
use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashSet;

const MIN_WORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "because", "been", "before", "but",
    "can", "could", "did", "does", "for", "from", "had", "has", "have", "her", "his", "how",
    "into", "its", "just", "more", "not", "now", "only", "other", "our", "out", "she", "should",
    "some", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "too", "very", "was", "were", "what", "when", "where", "which", "who", "why", "will", "with",
    "would", "you", "your",
];

/// Scores passages by the share of significant query words they contain.
#[derive(Debug, Clone, Default)]
pub struct KeywordRetriever;

impl KeywordRetriever {
    pub fn new() -> Self {
        Self
    }
}

/// Lowercase alphanumeric words of at least three characters, minus stopwords.
fn significant_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Fraction of `query_words` present in `text`, in [0, 1].
fn overlap_score(query_words: &HashSet<String>, text: &str) -> f32 {
    if query_words.is_empty() {
        return 0.0;
    }
    let passage_words = significant_words(text);
    let hits = query_words.intersection(&passage_words).count();
    hits as f32 / query_words.len() as f32
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(
        &self,
        query: &str,
        session: &Session,
        k: usize,
    ) -> Result<Vec<RetrievedPassage>> {
        let query_words = significant_words(query);

        let mut scored: Vec<RetrievedPassage> = session
            .passages
            .iter()
            .map(|passage| RetrievedPassage {
                passage: passage.clone(),
                score: overlap_score(&query_words, &passage.text),
            })
            .collect();

        // With no overlap anywhere the stable sort keeps source order, so the
        // first `k` passages are returned.
        scored.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a.passage.index.cmp(&b.passage.index),
            other => other,
        });
        scored.truncate(k);

        Ok(scored)
    }
}
