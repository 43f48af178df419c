use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tracing::info;

use crate::error::TurnError;
use crate::state::AppState;

const DEFAULT_SESSION_ID: &str = "default";

pub fn create_routes(state: AppState) -> Router<AppState> {
    let system = &state.config.system;

    Router::new()
        .route("/voice-chat", post(voice_chat))
        .route("/api/health", get(health_check))
        // Synthesized replies land in the cache dir; serve them for clients
        // that fetch audio by path instead of consuming the response body.
        .nest_service("/cache", ServeDir::new(&system.cache_dir))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let url = format!("{}/health", state.config.speech.base_url);
    let speech_healthy = state
        .http
        .get(&url)
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false);

    Json(json!({
        "status": "ok",
        "speech_service": speech_healthy
    }))
}

/// Submit one voice turn: multipart `file` (the recorded audio) plus an
/// optional `session_id` text field. Success returns the synthesized wav
/// bytes; failure returns `{error, stage, request_id}`.
async fn voice_chat(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut audio: Option<axum::body::Bytes> = None;
    let mut filename_hint = String::new();
    let mut session_id = DEFAULT_SESSION_ID.to_string();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("file") {
            filename_hint = field.file_name().unwrap_or_default().to_string();
            audio = field.bytes().await.ok();
        } else if field.name() == Some("session_id") {
            if let Ok(text) = field.text().await {
                if !text.is_empty() {
                    session_id = text;
                }
            }
        }
    }

    // A request without a file field degrades to an empty payload: it fails
    // validation inside the orchestrator, so the error body carries a
    // request id like every other outcome.
    let audio = audio.unwrap_or_default();

    let outcome = state
        .orchestrator
        .handle(&session_id, &audio, &filename_hint)
        .await;
    let ctx = outcome.context;

    match outcome.result {
        Ok(reply) => {
            info!(
                request_id = %ctx.request_id,
                "Replying with {:?} after {} ms", reply.audio_path, ctx.elapsed_ms()
            );
            match tokio::fs::read(&reply.audio_path).await {
                Ok(bytes) => {
                    let headers = [
                        ("content-type", "audio/wav".to_string()),
                        ("x-request-id", ctx.request_id.clone()),
                    ];
                    (headers, bytes).into_response()
                }
                Err(e) => failure_response(
                    &ctx.request_id,
                    &TurnError::Internal(format!("failed to read synthesized audio: {}", e)),
                ),
            }
        }
        Err(e) => failure_response(&ctx.request_id, &e),
    }
}

fn failure_response(request_id: &str, err: &TurnError) -> Response {
    (
        err.status_code(),
        Json(json!({
            "error": err.to_string(),
            "stage": err.stage(),
            "request_id": request_id,
        })),
    )
        .into_response()
}
