//! HTTP API server.
//!
//! Exposes video processing and chat over JSON, one session per video id.

use super::build_pipeline;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubechatError;
use crate::orchestrator::Orchestrator;
use crate::rag::{Answer, QaEngine};
use crate::session::SessionSummary;
use crate::video_ref::extract_video_id;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
    engine: QaEngine,
}

impl AppState {
    /// Both halves must share one session store.
    pub fn new(orchestrator: Orchestrator, engine: QaEngine) -> Self {
        Self {
            orchestrator,
            engine,
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/process-video", post(process_video))
        .route("/chat", post(chat))
        .route("/sessions", get(list_sessions).delete(clear_sessions))
        .route("/sessions/{video_id}", delete(clear_session))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let (orchestrator, engine) = build_pipeline(&settings)?;
    let app = router(Arc::new(AppState::new(orchestrator, engine)));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("tubechat API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Process video", "POST   /process-video");
    Output::kv("Chat", "POST   /chat");
    Output::kv("List sessions", "GET    /sessions");
    Output::kv("Clear session", "DELETE /sessions/{video_id}");
    Output::kv("Clear all", "DELETE /sessions");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessVideoRequest {
    youtube_url: String,
    /// Transcript text to use instead of fetching captions.
    #[serde(default)]
    transcript: Option<String>,
}

#[derive(Serialize)]
struct ProcessVideoResponse {
    video_id: String,
    transcript_preview: String,
    passages: usize,
    message: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    video_id: String,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    is_fallback: bool,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    index: usize,
    score: f32,
    text: String,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        Self {
            response: answer.answer,
            is_fallback: answer.is_fallback,
            sources: answer
                .sources
                .into_iter()
                .map(|s| SourceInfo {
                    index: s.passage.index,
                    score: s.score,
                    text: s.passage.text,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct SessionListResponse {
    sessions: Vec<SessionSummary>,
    total: usize,
}

#[derive(Serialize)]
struct ClearResponse {
    cleared: usize,
}

/// Error body: human message plus a stable kind for clients to branch on.
struct ApiError(TubechatError);

impl From<TubechatError> for ApiError {
    fn from(err: TubechatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }

        (
            status,
            Json(serde_json::json!({
                "error": self.0.to_string(),
                "kind": kind,
            })),
        )
            .into_response()
    }
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "sessions": state.engine.store().len().await,
    }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessVideoRequest>,
) -> Result<Json<ProcessVideoResponse>, ApiError> {
    let result = match req.transcript.as_deref() {
        Some(text) => {
            state
                .orchestrator
                .ingest_transcript(&req.youtube_url, text)
                .await?
        }
        None => state.orchestrator.process_video(&req.youtube_url).await?,
    };
    info!("Processed {} into {} passages", result.video_id, result.passages);

    Ok(Json(ProcessVideoResponse {
        video_id: result.video_id,
        transcript_preview: result.transcript_preview,
        passages: result.passages,
        message: "Video processed successfully".to_string(),
    }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let video_id = extract_video_id(&req.video_id)?;
    let answer = state.engine.ask(&video_id, &req.message).await?;
    Ok(Json(answer.into()))
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = state.engine.store().list().await;
    Json(SessionListResponse {
        total: sessions.len(),
        sessions,
    })
}

async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.engine.store().clear(&video_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(TubechatError::SessionNotFound(video_id).into())
    }
}

async fn clear_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cleared = state.engine.store().clear_all().await;
    Json(ClearResponse { cleared })
}
