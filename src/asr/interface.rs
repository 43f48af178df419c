use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    /// Base64-encoded audio bytes.
    pub audio: String,
    pub format: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Speech-to-text collaborator. Takes the ephemeral input file written by
/// the orchestrator plus a container hint, returns the transcript.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path, format_hint: &str)
        -> Result<String, anyhow::Error>;
}
