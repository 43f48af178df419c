use std::sync::Arc;

use crate::agent::{GeminiClient, ResponseGenerator};
use crate::asr::SpeechServiceTranscriber;
use crate::config::Config;
use crate::history::HistoryStore;
use crate::orchestrator::TurnOrchestrator;
use crate::tts::SpeechServiceSynthesizer;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub orchestrator: Arc<TurnOrchestrator>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();

        let api_key = std::env::var(&config.llm.api_key_env).map_err(|_| {
            anyhow::anyhow!(
                "{} must be set before the first model call",
                config.llm.api_key_env
            )
        })?;

        let transcriber = Arc::new(SpeechServiceTranscriber::new(
            http.clone(),
            config.speech.base_url.clone(),
        ));
        let synthesizer = Arc::new(SpeechServiceSynthesizer::new(
            http.clone(),
            config.speech.base_url.clone(),
            config.speech.voice.clone(),
            config.speech.language.clone(),
        ));
        let llm = Arc::new(GeminiClient::new(
            http.clone(),
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            api_key,
        ));

        let responder = ResponseGenerator::new(
            llm,
            HistoryStore::new(&config.system.history_dir),
            config.llm.system_instruction.clone(),
        );

        let orchestrator = TurnOrchestrator::new(
            transcriber,
            responder,
            synthesizer,
            config.system.cache_dir.clone(),
            config.system.accepted_format.clone(),
        );

        Ok(Self {
            config,
            http,
            orchestrator: Arc::new(orchestrator),
        })
    }
}
