//! Search command implementation.

use super::{build_pipeline, load_video};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    video: &str,
    query: &str,
    limit: usize,
    transcript_file: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let operation = Operation::Search {
        fetch_captions: transcript_file.is_none(),
    };
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let (orchestrator, engine) = build_pipeline(&settings)?;
    let processed = load_video(&orchestrator, video, transcript_file).await?;

    let results = engine.search(&processed.video_id, query, limit).await?;

    if results.is_empty() {
        Output::info("No passages found.");
        return Ok(());
    }

    Output::header(&format!("Top {} passages", results.len()));
    for (i, result) in results.iter().enumerate() {
        Output::source(i + 1, result);
    }

    Ok(())
}
