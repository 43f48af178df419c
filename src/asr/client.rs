use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::Path;
use tracing::debug;

use super::interface::{TranscriptionRequest, TranscriptionResponse, Transcriber};

/// Transcriber backed by the external speech service.
pub struct SpeechServiceTranscriber {
    client: reqwest::Client,
    base_url: String,
}

impl SpeechServiceTranscriber {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl Transcriber for SpeechServiceTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        format_hint: &str,
    ) -> Result<String, anyhow::Error> {
        let audio_bytes = tokio::fs::read(audio_path).await?;
        let request = TranscriptionRequest {
            audio: BASE64.encode(&audio_bytes),
            format: format_hint.to_string(),
        };

        let url = format!("{}/asr/transcribe", self.base_url);
        debug!("Sending ASR request: {} bytes of {}", audio_bytes.len(), format_hint);

        let response = self.client.post(&url).json(&request).send().await?;
        let result: TranscriptionResponse = response.json().await?;

        if result.success {
            Ok(result.text)
        } else {
            let message = result.error.unwrap_or_else(|| "Unknown error".to_string());
            Err(anyhow::anyhow!("transcription failed: {}", message))
        }
    }
}
