//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod search;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use search::run_search;
pub use serve::{router, run_serve, AppState};

use crate::cli::Output;
use crate::config::Settings;
use crate::generation::OpenAIGenerator;
use crate::orchestrator::{Orchestrator, ProcessResult};
use crate::rag::QaEngine;
use crate::session::SessionStore;
use std::sync::Arc;

/// Build the full pipeline from settings.
fn build_pipeline(settings: &Settings) -> crate::Result<(Orchestrator, QaEngine)> {
    let store = Arc::new(SessionStore::new());
    let orchestrator = Orchestrator::new(settings, store.clone())?;

    let generator = Arc::new(
        OpenAIGenerator::new(&settings.generation.model)?
            .with_temperature(settings.generation.temperature)
            .with_max_tokens(settings.generation.max_tokens),
    );
    let engine = QaEngine::from_settings(settings, store, orchestrator.embedder(), generator)?;

    Ok((orchestrator, engine))
}

/// Process a video for a one-off CLI command, from captions or a local transcript file.
async fn load_video(
    orchestrator: &Orchestrator,
    video: &str,
    transcript_file: Option<&str>,
) -> anyhow::Result<ProcessResult> {
    let spinner = Output::spinner("Processing video...");

    let result = match transcript_file {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            let text = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Failed to read transcript file {}: {}", path, e))?;
            orchestrator.ingest_transcript(video, &text).await
        }
        None => orchestrator.process_video(video).await,
    };
    spinner.finish_and_clear();

    let result = result?;
    Output::success(&format!(
        "Indexed {} ({} passages)",
        result.video_id, result.passages
    ));
    Ok(result)
}
