//! CLI output formatting utilities.

use crate::rag::{Answer, RetrievedPassage};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Characters of passage text shown under each source.
const SOURCE_PREVIEW_CHARS: usize = 160;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print an answer followed by its sources.
    pub fn answer(answer: &Answer) {
        println!("\n{}", answer.answer);

        if answer.is_fallback || answer.sources.is_empty() {
            return;
        }

        println!("\n{}", style("Sources").dim().underlined());
        for (i, source) in answer.sources.iter().enumerate() {
            Self::source(i + 1, source);
        }
    }

    /// Print one retrieved passage, numbered as it appears in the prompt.
    pub fn source(number: usize, source: &RetrievedPassage) {
        println!(
            "{} passage {} (score: {:.2})",
            style(format!("[{}]", number)).cyan(),
            source.passage.index + 1,
            source.score
        );
        println!(
            "    {}",
            style(source.passage.preview(SOURCE_PREVIEW_CHARS)).dim()
        );
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
