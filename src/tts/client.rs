use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, error};

use super::interface::{SpeechSynthesizer, SynthesisRequest, SynthesisResponse};

/// Synthesizer backed by the external speech service.
pub struct SpeechServiceSynthesizer {
    client: reqwest::Client,
    base_url: String,
    default_voice: Option<String>,
    default_language: Option<String>,
}

impl SpeechServiceSynthesizer {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        default_voice: Option<String>,
        default_language: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            default_voice,
            default_language,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechServiceSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, anyhow::Error> {
        let request = SynthesisRequest {
            text: text.to_string(),
            voice: self.default_voice.clone(),
            language: self.default_language.clone(),
        };

        let url = format!("{}/tts/synthesize", self.base_url);
        debug!("Sending TTS request: text={}", text);

        let response = self.client.post(&url).json(&request).send().await?;
        let result: SynthesisResponse = response.json().await?;

        if result.success {
            debug!("TTS synthesis successful: {}", result.audio_path);
            Ok(PathBuf::from(result.audio_path))
        } else {
            let message = result.error.unwrap_or_else(|| "Unknown error".to_string());
            error!("TTS synthesis failed: {}", message);
            Err(anyhow::anyhow!("synthesis failed: {}", message))
        }
    }
}
