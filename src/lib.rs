//! tubechat - Chat with a video's transcript
//!
//! Answers natural-language questions about what was said in a video. The
//! transcript is split into passages, the passages are embedded and indexed,
//! and each question is answered by a language model that only sees the
//! passages most relevant to it.
//!
//! # Architecture
//!
//! - `transcript` - Transcript providers (yt-dlp captions, static text)
//! - `video_ref` - Video URL / id parsing
//! - `chunking` - Passage splitting
//! - `embedding` - Embedding generation
//! - `index` - In-memory vector index
//! - `session` - Per-video sessions and conversation history
//! - `rag` - Retrieval, prompt composition and the QA engine
//! - `generation` - Answer generation
//! - `orchestrator` - Session building
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tubechat::config::Settings;
//! use tubechat::generation::OpenAIGenerator;
//! use tubechat::orchestrator::Orchestrator;
//! use tubechat::rag::QaEngine;
//! use tubechat::session::SessionStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = Arc::new(SessionStore::new());
//!
//!     let orchestrator = Orchestrator::new(&settings, store.clone())?;
//!     let generator = Arc::new(OpenAIGenerator::new(&settings.generation.model)?);
//!     let engine = QaEngine::from_settings(&settings, store, orchestrator.embedder(), generator)?;
//!
//!     let video = orchestrator.process_video("https://youtu.be/dQw4w9WgXcQ").await?;
//!     let answer = engine.ask(&video.video_id, "What is the song about?").await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod video_ref;

pub use error::{ErrorKind, Result, TubechatError};
