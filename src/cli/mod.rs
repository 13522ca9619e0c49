//! CLI module for tubechat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// tubechat - Chat with a video's transcript
///
/// Fetches a video's captions, indexes them, and answers questions using only
/// what was said in the video.
#[derive(Parser, Debug)]
#[command(name = "tubechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question about a video
    Ask {
        /// YouTube URL or video ID
        video: String,

        /// The question to ask
        question: String,

        /// Read the transcript from a file instead of fetching captions
        #[arg(short, long)]
        transcript_file: Option<String>,

        /// Number of passages to put in the prompt
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start an interactive chat about a video
    Chat {
        /// YouTube URL or video ID
        video: String,

        /// Read the transcript from a file instead of fetching captions
        #[arg(short, long)]
        transcript_file: Option<String>,
    },

    /// Show the transcript passages most relevant to a query
    Search {
        /// YouTube URL or video ID
        video: String,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Read the transcript from a file instead of fetching captions
        #[arg(short, long)]
        transcript_file: Option<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
