use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// The pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Validation,
    SpeechToText,
    ResponseGeneration,
    SpeechSynthesis,
    Internal,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::SpeechToText => "speech-to-text",
            Stage::ResponseGeneration => "response-generation",
            Stage::SpeechSynthesis => "speech-synthesis",
            Stage::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Structured failure for one voice turn. Upstream collaborator errors are
/// reduced to a human-readable message tagged with the failing stage; they
/// never cross this boundary as raw error values.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{stage} failed: {message}")]
    Upstream { stage: Stage, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl TurnError {
    pub fn stage(&self) -> Stage {
        match self {
            TurnError::Validation(_) => Stage::Validation,
            TurnError::Upstream { stage, .. } => *stage,
            TurnError::Internal(_) => Stage::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            TurnError::Validation(_) => StatusCode::BAD_REQUEST,
            TurnError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            TurnError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
