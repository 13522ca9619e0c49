//! Ask command implementation.

use super::{build_pipeline, load_video};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    video: &str,
    question: &str,
    transcript_file: Option<&str>,
    top_k: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    let operation = Operation::Answer {
        fetch_captions: transcript_file.is_none(),
    };
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(k) = top_k {
        settings.retrieval.top_k = k;
        settings.validate()?;
    }

    let (orchestrator, engine) = build_pipeline(&settings)?;
    let processed = load_video(&orchestrator, video, transcript_file).await?;

    let spinner = Output::spinner("Thinking...");
    let result = engine.ask(&processed.video_id, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            Output::answer(&answer);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
