use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request for synthesizing text to speech.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: Option<String>,
    pub language: Option<String>,
}

/// Response containing the path of the generated audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResponse {
    pub audio_path: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Speech-synthesis collaborator. Returns the path of the synthesized audio
/// file; reclaiming that file is the caller's concern.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, anyhow::Error>;
}
