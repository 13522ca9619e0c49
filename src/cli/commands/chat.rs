//! Interactive chat command.

use super::{build_pipeline, load_video};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(video: &str, transcript_file: Option<&str>, settings: Settings) -> Result<()> {
    let operation = Operation::Answer {
        fetch_captions: transcript_file.is_none(),
    };
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let (orchestrator, engine) = build_pipeline(&settings)?;
    let processed = load_video(&orchestrator, video, transcript_file).await?;
    let video_id = processed.video_id;

    println!("\n{}", style("tubechat").bold().cyan());
    Output::kv("Transcript", &processed.transcript_preview);
    println!(
        "\n{}\n",
        style("Ask about the video, 'sources' to show the last sources, 'clear' to reset, 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut last_answer = None;

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            engine.store().reset_history(&video_id).await?;
            last_answer = None;
            Output::info("Conversation history cleared.");
            continue;
        }

        if input.eq_ignore_ascii_case("sources") {
            match &last_answer {
                Some(answer) => Output::answer(answer),
                None => Output::info("Nothing asked yet."),
            }
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let result = engine.ask(&video_id, input).await;
        spinner.finish_and_clear();

        match result {
            Ok(answer) => {
                println!("\n{} {}\n", style("tubechat:").cyan().bold(), answer.answer);
                last_answer = Some(answer);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
