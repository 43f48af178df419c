use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

/// Fixed instruction injected as the leading turn of every new session.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a responsive, intelligent, and fluent virtual assistant who communicates in Indonesian.
Your task is to provide clear, concise, and informative answers in response to user queries or statements spoken through voice.

Your answers must:
- Be written in polite and easily understandable Indonesian.
- Be short and to the point (maximum 2-3 sentences).
- Avoid repeating the user's question; respond directly with the answer.

If you're unsure about an answer, be honest and say that you don't know.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_history_dir")]
    pub history_dir: String,
    /// The single audio container the pipeline accepts; anything else is
    /// rejected rather than transcoded.
    #[serde(default = "default_accepted_format")]
    pub accepted_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_language")]
    pub language: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cache_dir() -> String {
    "cache".to_string()
}

fn default_history_dir() -> String {
    "chat_history".to_string()
}

fn default_accepted_format() -> String {
    "wav".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_system_instruction() -> String {
    SYSTEM_INSTRUCTION.to_string()
}

fn default_speech_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_language() -> Option<String> {
    Some("id".to_string())
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            llm: LlmConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_dir: default_cache_dir(),
            history_dir: default_history_dir(),
            accepted_format: default_accepted_format(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
            system_instruction: default_system_instruction(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            voice: None,
            language: default_language(),
        }
    }
}
