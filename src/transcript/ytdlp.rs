//! YouTube caption provider backed by yt-dlp.
//!
//! yt-dlp lists the caption tracks of a video; the selected track is then
//! downloaded in YouTube's `json3` timed-text format and flattened to segments.

use super::{TranscriptProvider, TranscriptSegment};
use crate::error::{Result, TranscriptIssue, TubechatError};
use crate::video_ref::watch_url;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

const CAPTION_FORMAT: &str = "json3";

/// Caption provider using yt-dlp for track discovery.
pub struct YtDlpProvider {
    http: reqwest::Client,
    languages: Vec<String>,
    allow_generated: bool,
}

impl YtDlpProvider {
    pub fn new(languages: Vec<String>, allow_generated: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            languages,
            allow_generated,
        })
    }

    /// Run yt-dlp and return its metadata JSON for the video.
    async fn fetch_metadata(&self, video_id: &str) -> Result<Value> {
        let url = watch_url(video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--skip-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubechatError::ToolNotFound("yt-dlp".to_string())
                } else {
                    TubechatError::Provider(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unavailable_message(&stderr) {
                return Err(TubechatError::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                    issue: TranscriptIssue::NotFound,
                });
            }
            return Err(TubechatError::Provider(format!(
                "yt-dlp failed for {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| TubechatError::Provider(format!("Failed to parse yt-dlp output: {}", e)))
    }
}

#[async_trait]
impl TranscriptProvider for YtDlpProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let metadata = self.fetch_metadata(video_id).await?;

        let track = select_track(&metadata, &self.languages, self.allow_generated).map_err(
            |issue| TubechatError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                issue,
            },
        )?;

        info!(
            "Using {} captions ({})",
            if track.generated { "auto-generated" } else { "manual" },
            track.language
        );

        let body = self
            .http
            .get(&track.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_json3(&body)?;
        debug!("Fetched {} caption segments", segments.len());

        if segments.is_empty() {
            return Err(TubechatError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                issue: TranscriptIssue::NotFound,
            });
        }

        Ok(segments)
    }
}

/// A caption track chosen for download.
#[derive(Debug, Clone, PartialEq)]
struct CaptionTrack {
    language: String,
    url: String,
    generated: bool,
}

/// Pick a caption track: manual subtitles before auto-generated ones, and
/// languages in preference order. A language matches its regional variants
/// (`en` matches `en-US`).
fn select_track(
    metadata: &Value,
    languages: &[String],
    allow_generated: bool,
) -> std::result::Result<CaptionTrack, TranscriptIssue> {
    let manual = metadata["subtitles"].as_object();
    let generated = metadata["automatic_captions"].as_object();

    let has_any = |tracks: Option<&serde_json::Map<String, Value>>| {
        tracks.is_some_and(|t| !t.is_empty())
    };
    if !has_any(manual) && !has_any(generated) {
        return Err(TranscriptIssue::Disabled);
    }

    let mut sources = vec![(manual, false)];
    if allow_generated {
        sources.push((generated, true));
    }

    for (tracks, is_generated) in sources {
        let Some(tracks) = tracks else { continue };
        for language in languages {
            let prefix = format!("{}-", language);
            let found = tracks
                .iter()
                .filter(|(key, _)| *key == language || key.starts_with(&prefix))
                .find_map(|(key, formats)| json3_url(formats).map(|url| (key, url)));

            if let Some((key, url)) = found {
                return Ok(CaptionTrack {
                    language: key.clone(),
                    url,
                    generated: is_generated,
                });
            }
        }
    }

    Err(TranscriptIssue::NotFound)
}

fn json3_url(formats: &Value) -> Option<String> {
    formats
        .as_array()?
        .iter()
        .find(|f| f["ext"].as_str() == Some(CAPTION_FORMAT))
        .and_then(|f| f["url"].as_str())
        .map(str::to_string)
}

fn is_unavailable_message(stderr: &str) -> bool {
    ["Video unavailable", "Private video", "This video has been removed"]
        .iter()
        .any(|needle| stderr.contains(needle))
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Flatten a `json3` caption document into non-empty segments.
fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>> {
    let doc: TimedText = serde_json::from_str(body)
        .map_err(|e| TubechatError::Provider(format!("Failed to parse captions: {}", e)))?;

    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                text.to_string(),
                event.start_ms as f64 / 1000.0,
                event.duration_ms as f64 / 1000.0,
            ))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_tracks_means_disabled() {
        let metadata = json!({ "subtitles": {}, "automatic_captions": {} });
        assert_eq!(
            select_track(&metadata, &langs(&["en"]), true),
            Err(TranscriptIssue::Disabled)
        );
        assert_eq!(
            select_track(&json!({}), &langs(&["en"]), true),
            Err(TranscriptIssue::Disabled)
        );
    }

    #[test]
    fn test_prefers_manual_track() {
        let metadata = json!({
            "subtitles": {
                "en-GB": [{ "ext": "vtt", "url": "https://x/vtt" }, { "ext": "json3", "url": "https://x/manual" }]
            },
            "automatic_captions": {
                "en": [{ "ext": "json3", "url": "https://x/auto" }]
            }
        });

        let track = select_track(&metadata, &langs(&["en"]), true).unwrap();
        assert_eq!(track.url, "https://x/manual");
        assert_eq!(track.language, "en-GB");
        assert!(!track.generated);
    }

    #[test]
    fn test_generated_track_respects_setting() {
        let metadata = json!({
            "subtitles": {},
            "automatic_captions": { "en": [{ "ext": "json3", "url": "https://x/auto" }] }
        });

        let track = select_track(&metadata, &langs(&["en"]), true).unwrap();
        assert!(track.generated);

        assert_eq!(
            select_track(&metadata, &langs(&["en"]), false),
            Err(TranscriptIssue::NotFound)
        );
    }

    #[test]
    fn test_wrong_language_is_not_found() {
        let metadata = json!({
            "subtitles": { "de": [{ "ext": "json3", "url": "https://x/de" }] }
        });
        assert_eq!(
            select_track(&metadata, &langs(&["en", "fr"]), true),
            Err(TranscriptIssue::NotFound)
        );
    }

    #[test]
    fn test_parse_json3() {
        let body = r#"{
            "events": [
                { "tStartMs": 0, "dDurationMs": 1500, "segs": [{ "utf8": "Hello" }, { "utf8": " there" }] },
                { "tStartMs": 1500, "dDurationMs": 10, "aAppend": 1, "segs": [{ "utf8": "\n" }] },
                { "tStartMs": 2000 },
                { "tStartMs": 2500, "dDurationMs": 2000, "segs": [{ "utf8": "general\nKenobi" }] }
            ]
        }"#;

        let segments = parse_json3(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello there");
        assert_eq!(segments[0].duration_seconds, 1.5);
        assert_eq!(segments[1].text, "general Kenobi");
        assert_eq!(segments[1].start_seconds, 2.5);
    }

    #[test]
    fn test_parse_json3_rejects_garbage() {
        let err = parse_json3("<html>").unwrap_err();
        assert!(err.kind().is_transient());
    }
}
