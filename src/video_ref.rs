//! Video reference parsing.
//!
//! Users hand over whatever they copied from the browser: a watch URL, a short
//! link, an embed URL, or just the id. Everything resolves to the 11-character id.

use crate::error::{Result, TubechatError};
use regex::Regex;
use std::sync::LazyLock;

static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:
            # URL forms
            ^(?:https?://)?
            (?:(?:www|m)\.)?
            (?:
                youtube\.com/watch\?(?:[^\#]*&)?v=
                | youtu\.be/
                | youtube\.com/embed/
                | youtube\.com/shorts/
                | youtube\.com/v/
            )
            ([A-Za-z0-9_-]{11})
            (?:[^A-Za-z0-9_-]|$)
        )
        |
        # Bare video id
        ^([A-Za-z0-9_-]{11})$
        ",
    )
    .expect("Invalid regex")
});

/// Extract the 11-character video id from a URL or a bare id.
pub fn extract_video_id(input: &str) -> Result<String> {
    let trimmed = input.trim();
    VIDEO_ID_REGEX
        .captures(trimmed)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TubechatError::InvalidReference(trimmed.to_string()))
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
