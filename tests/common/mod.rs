//! Deterministic stand-ins for the external providers.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tubechat::config::Settings;
use tubechat::embedding::Embedder;
use tubechat::generation::Generator;
use tubechat::orchestrator::Orchestrator;
use tubechat::rag::QaEngine;
use tubechat::session::SessionStore;
use tubechat::transcript::StaticProvider;
use tubechat::{Result, TubechatError};

const DIMENSIONS: usize = 1024;

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension.
pub struct HashEmbedder;

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let slot = (fnv1a(&word.to_lowercase()) % DIMENSIONS as u64) as usize;
            vector[slot] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Embeds passages fine but fails every query after the first `ok_calls` calls.
pub struct FlakyEmbedder {
    pub ok_calls: usize,
    calls: Mutex<usize>,
}

impl FlakyEmbedder {
    pub fn new(ok_calls: usize) -> Self {
        Self {
            ok_calls,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await
            .map(|mut v| v.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut calls = self.calls.lock().await;
        *calls += 1;
        if *calls > self.ok_calls {
            return Err(TubechatError::Provider("embedding service unavailable".to_string()));
        }
        HashEmbedder.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Replies with a fixed answer and records every prompt it was given.
pub struct CannedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().await.push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Settings with small passages so short test transcripts split up.
pub fn small_passage_settings(max_chars: usize) -> Settings {
    let mut settings = Settings::default();
    settings.chunking.max_chars = max_chars;
    settings.chunking.overlap_chars = 0;
    settings
}

/// Orchestrator and engine sharing one store, wired to the stubs.
pub fn pipeline(
    settings: &Settings,
    provider: StaticProvider,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
) -> (Orchestrator, QaEngine) {
    let store = Arc::new(SessionStore::new());
    let orchestrator =
        Orchestrator::with_components(settings, Arc::new(provider), embedder.clone(), store.clone())
            .unwrap();
    let engine = QaEngine::from_settings(settings, store, embedder, generator).unwrap();
    (orchestrator, engine)
}
