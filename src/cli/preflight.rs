//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TubechatError};
use crate::openai::is_api_key_configured;
use crate::rag::RetrievalStrategy;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering needs the API key, and yt-dlp unless a transcript file is given.
    Answer { fetch_captions: bool },
    /// Search needs the API key only for embedding retrieval.
    Search { fetch_captions: bool },
    /// The server fetches captions on demand and answers questions.
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let needs_embeddings = settings.retrieval.strategy == RetrievalStrategy::Embedding;

    match operation {
        Operation::Answer { fetch_captions } => {
            check_api_key()?;
            if fetch_captions {
                check_tool("yt-dlp")?;
            }
        }
        Operation::Search { fetch_captions } => {
            if needs_embeddings {
                check_api_key()?;
            }
            if fetch_captions {
                check_tool("yt-dlp")?;
            }
        }
        Operation::Serve => {
            check_api_key()?;
            check_tool("yt-dlp")?;
        }
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(TubechatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubechatError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubechatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubechatError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
