//! Per-question pipeline: retrieve, compose, generate, record.

use super::{create_retriever, KeywordRetriever, PromptComposer, RetrievalStrategy, RetrievedPassage, Retriever};
use crate::config::{Prompts, Settings};
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use crate::generation::Generator;
use crate::session::{Exchange, Session, SessionStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// An answer with the passages it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// The generated answer text. Never empty.
    pub answer: String,
    /// Passages placed in the prompt, in prompt order.
    pub sources: Vec<RetrievedPassage>,
    /// Whether the answer is the "not in the transcript" phrase.
    pub is_fallback: bool,
}

/// Answers questions against the sessions in a [`SessionStore`].
pub struct QaEngine {
    store: Arc<SessionStore>,
    retriever: Arc<dyn Retriever>,
    fallback_retriever: Option<Arc<dyn Retriever>>,
    generator: Arc<dyn Generator>,
    composer: PromptComposer,
    top_k: usize,
    max_history: usize,
}

impl QaEngine {
    pub fn new(
        store: Arc<SessionStore>,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            store,
            retriever,
            fallback_retriever: None,
            generator,
            composer: PromptComposer::default(),
            top_k: 3,
            max_history: 6,
        }
    }

    /// Build an engine from settings, wiring in the configured retrieval strategy.
    pub fn from_settings(
        settings: &Settings,
        store: Arc<SessionStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let retriever = create_retriever(settings.retrieval.strategy, embedder);
        let keyword_fallback = settings.retrieval.keyword_fallback
            && settings.retrieval.strategy == RetrievalStrategy::Embedding;

        Ok(Self::new(store, retriever, generator)
            .with_prompts(prompts)
            .with_top_k(settings.retrieval.top_k)
            .with_max_history(settings.generation.max_history)
            .with_keyword_fallback(keyword_fallback))
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.composer = PromptComposer::new(prompts);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Answer from keyword overlap when the primary retriever fails.
    pub fn with_keyword_fallback(mut self, enabled: bool) -> Self {
        self.fallback_retriever = if enabled {
            Some(Arc::new(KeywordRetriever::new()))
        } else {
            None
        };
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Answer a question about a processed video and record the exchange.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, video_id: &str, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TubechatError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        info!("Answering question for {}", video_id);

        // Held for the whole request: a concurrent replacement does not affect it.
        let session = self.store.get(video_id).await?;
        let sources = self.retrieve(&session, question, self.top_k).await?;

        let history = session.history().await;
        let texts: Vec<String> = sources.iter().map(|s| s.passage.text.clone()).collect();
        let prompt = self
            .composer
            .compose(&texts, question, &history, self.max_history);

        let raw = self.generator.generate(&prompt).await?;
        let fallback = self.composer.fallback();
        let answer = match raw.trim() {
            "" => {
                debug!("Generator returned nothing, using fallback answer");
                fallback.to_string()
            }
            text => text.to_string(),
        };
        let is_fallback = answer == fallback;

        session.record(Exchange::new(question, answer.clone())).await;

        debug!(
            "Answered with {} sources (fallback: {})",
            sources.len(),
            is_fallback
        );

        Ok(Answer {
            answer,
            sources,
            is_fallback,
        })
    }

    /// Retrieve passages for a query without generating an answer.
    #[instrument(skip(self))]
    pub async fn search(&self, video_id: &str, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        let session = self.store.get(video_id).await?;
        self.retrieve(&session, query, k).await
    }

    async fn retrieve(&self, session: &Session, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        match (
            self.retriever.retrieve(query, session, k).await,
            &self.fallback_retriever,
        ) {
            (Err(TubechatError::RetrievalFailed(reason)), Some(fallback)) => {
                warn!("Retrieval failed ({}), falling back to keyword matching", reason);
                fallback.retrieve(query, session, k).await
            }
            (result, _) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Passage;
    use crate::config::FALLBACK_ANSWER;
    use crate::error::ErrorKind;
    use crate::index::VectorIndex;
    use crate::transcript::Transcript;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn retrieve(&self, _: &str, _: &Session, _: usize) -> Result<Vec<RetrievedPassage>> {
            Err(TubechatError::RetrievalFailed("provider down".to_string()))
        }
    }

    /// Query embeddings come back one axis wider than the indexed passages.
    struct WideEmbedder;

    #[async_trait]
    impl Embedder for WideEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Returns a canned reply and remembers every prompt.
    struct CannedGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Generator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().await.push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    async fn store_with(video_id: &str, texts: &[&str]) -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::new());
        let passages = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Passage::new(i, t.to_string()))
            .collect();
        store
            .create_or_replace(Session::new(
                Transcript::from_text(video_id.to_string(), &texts.join(" ")),
                passages,
                VectorIndex::empty(),
            ))
            .await;
        store
    }

    #[tokio::test]
    async fn test_keyword_fallback_on_retrieval_failure() {
        let store = store_with("aaaaaaaaaaa", &["Cats are mammals.", "Dogs are mammals too."]).await;
        let generator = CannedGenerator::new("Yes [2]");

        let engine = QaEngine::new(store, Arc::new(FailingRetriever), generator.clone())
            .with_keyword_fallback(true);

        let answer = engine.ask("aaaaaaaaaaa", "Are dogs mammals?").await.unwrap();
        assert_eq!(answer.answer, "Yes [2]");
        assert_eq!(answer.sources[0].passage.text, "Dogs are mammals too.");
        assert!(generator.prompts.lock().await[0].contains("Dogs are mammals too."));
    }

    #[tokio::test]
    async fn test_keyword_fallback_on_wrong_dimension_query() {
        let store = Arc::new(SessionStore::new());
        let texts = ["Cats are mammals.", "Dogs are mammals too."];
        store
            .create_or_replace(Session::new(
                Transcript::from_text("aaaaaaaaaaa".to_string(), &texts.join(" ")),
                texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| Passage::new(i, t.to_string()))
                    .collect(),
                VectorIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap(),
            ))
            .await;

        let retriever = create_retriever(RetrievalStrategy::Embedding, Arc::new(WideEmbedder));
        let engine = QaEngine::new(store.clone(), retriever.clone(), CannedGenerator::new("Yes [1]"))
            .with_keyword_fallback(true);
        let answer = engine.ask("aaaaaaaaaaa", "Are dogs mammals?").await.unwrap();
        assert_eq!(answer.sources[0].passage.text, "Dogs are mammals too.");

        let engine = QaEngine::new(store, retriever, CannedGenerator::new("unused"));
        let err = engine.ask("aaaaaaaaaaa", "Are dogs mammals?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RetrievalFailed);
    }

    #[tokio::test]
    async fn test_retrieval_failure_without_fallback() {
        let store = store_with("aaaaaaaaaaa", &["text"]).await;
        let engine = QaEngine::new(
            store.clone(),
            Arc::new(FailingRetriever),
            CannedGenerator::new("unused"),
        );

        let err = engine.ask("aaaaaaaaaaa", "anything").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RetrievalFailed);
        assert!(store.history("aaaaaaaaaaa").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_generation_becomes_fallback() {
        let store = store_with("aaaaaaaaaaa", &["Boil the pasta."]).await;
        let engine = QaEngine::new(store.clone(), Arc::new(KeywordRetriever::new()), CannedGenerator::new("  "));

        let answer = engine.ask("aaaaaaaaaaa", "Who is the president?").await.unwrap();
        assert_eq!(answer.answer, FALLBACK_ANSWER);
        assert!(answer.is_fallback);

        let history = store.history("aaaaaaaaaaa").await.unwrap();
        assert_eq!(history[0].answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_custom_fallback_phrase() {
        const PHRASE: &str = "Not covered by this video.";
        let mut prompts = Prompts::default();
        prompts.qa.fallback = PHRASE.to_string();

        let store = store_with("aaaaaaaaaaa", &["Boil the pasta."]).await;
        let generator = CannedGenerator::new(PHRASE);
        let engine = QaEngine::new(store.clone(), Arc::new(KeywordRetriever::new()), generator.clone())
            .with_prompts(prompts.clone());

        let answer = engine.ask("aaaaaaaaaaa", "Who is the president?").await.unwrap();
        assert_eq!(answer.answer, PHRASE);
        assert!(answer.is_fallback);
        assert!(generator.prompts.lock().await[0].contains(PHRASE));

        let engine = QaEngine::new(store.clone(), Arc::new(KeywordRetriever::new()), CannedGenerator::new(""))
            .with_prompts(prompts);
        let answer = engine.ask("aaaaaaaaaaa", "Who won the cup?").await.unwrap();
        assert_eq!(answer.answer, PHRASE);
        assert!(answer.is_fallback);
        assert_eq!(store.history("aaaaaaaaaaa").await.unwrap()[1].answer, PHRASE);
    }

    #[tokio::test]
    async fn test_history_flows_into_next_prompt() {
        let store = store_with("aaaaaaaaaaa", &["Dogs bark."]).await;
        let generator = CannedGenerator::new("They bark [1].");
        let engine = QaEngine::new(store, Arc::new(KeywordRetriever::new()), generator.clone())
            .with_max_history(1);

        engine.ask("aaaaaaaaaaa", "What do dogs do?").await.unwrap();
        engine.ask("aaaaaaaaaaa", "Loudly?").await.unwrap();

        let prompts = generator.prompts.lock().await;
        assert!(!prompts[0].contains("Q: What do dogs do?"));
        assert!(prompts[1].contains("Q: What do dogs do?\nA: They bark [1]."));
    }

    #[tokio::test]
    async fn test_rejects_blank_question_and_unknown_video() {
        let store = store_with("aaaaaaaaaaa", &["text"]).await;
        let engine = QaEngine::new(store, Arc::new(KeywordRetriever::new()), CannedGenerator::new("x"));

        let err = engine.ask("aaaaaaaaaaa", "   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = engine.ask("bbbbbbbbbbb", "hello?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotFound);
    }

    #[tokio::test]
    async fn test_search_does_not_touch_history() {
        let store = store_with("aaaaaaaaaaa", &["Cats purr.", "Dogs bark."]).await;
        let engine = QaEngine::new(store.clone(), Arc::new(KeywordRetriever::new()), CannedGenerator::new("x"));

        let results = engine.search("aaaaaaaaaaa", "dogs", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].passage.text, "Dogs bark.");
        assert!(store.history("aaaaaaaaaaa").await.unwrap().is_empty());
    }
}
