use futures::FutureExt;
use std::fs;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, warn};

use crate::agent::ResponseGenerator;
use crate::asr::Transcriber;
use crate::error::{Stage, TurnError};
use crate::request_context::RequestContext;
use crate::tts::SpeechSynthesizer;

/// Successful turn: the synthesized reply audio plus the intermediate text,
/// handed to the transport layer.
#[derive(Debug)]
pub struct SynthesizedReply {
    pub audio_path: PathBuf,
    pub transcript: String,
    pub reply_text: String,
}

pub type TurnResult = Result<SynthesizedReply, TurnError>;

/// What one request leaves behind: its context for correlation and the
/// tagged outcome. `handle` always produces one of these, never a fault.
#[derive(Debug)]
pub struct TurnOutcome {
    pub context: RequestContext,
    pub result: TurnResult,
}

/// Ephemeral input artifact scoped to one request. Removed on drop, so no
/// exit path can leak it.
struct EphemeralFile {
    path: PathBuf,
}

impl EphemeralFile {
    fn write(path: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Guard first: a write that fails partway through must not leave a
        // truncated artifact behind.
        let guard = Self {
            path: path.to_path_buf(),
        };
        fs::write(path, bytes)?;
        Ok(guard)
    }
}

impl Drop for EphemeralFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove ephemeral file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Drives one full voice turn: validation, speech-to-text,
/// response-generation, speech-synthesis. Strictly linear and non-retrying;
/// retry policy belongs to the collaborators.
pub struct TurnOrchestrator {
    transcriber: Arc<dyn Transcriber>,
    responder: ResponseGenerator,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    cache_dir: PathBuf,
    accepted_format: String,
}

impl TurnOrchestrator {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        responder: ResponseGenerator,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        cache_dir: impl Into<PathBuf>,
        accepted_format: impl Into<String>,
    ) -> Self {
        Self {
            transcriber,
            responder,
            synthesizer,
            cache_dir: cache_dir.into(),
            accepted_format: accepted_format.into(),
        }
    }

    /// Run one turn end to end. Unexpected faults are caught here and
    /// reported as internal failures carrying the request id.
    pub async fn handle(&self, session_id: &str, audio: &[u8], filename_hint: &str) -> TurnOutcome {
        let mut ctx = RequestContext::new();

        let caught = AssertUnwindSafe(self.run_turn(&mut ctx, session_id, audio, filename_hint))
            .catch_unwind()
            .await;

        let result = match caught {
            Ok(result) => result,
            Err(_) => {
                error!(request_id = %ctx.request_id, "Turn aborted by unexpected fault");
                Err(TurnError::Internal(
                    "unexpected fault during turn processing".to_string(),
                ))
            }
        };

        if let Err(e) = &result {
            ctx.mark(&e.stage().to_string(), &e.to_string());
        }

        TurnOutcome {
            context: ctx,
            result,
        }
    }

    async fn run_turn(
        &self,
        ctx: &mut RequestContext,
        session_id: &str,
        audio: &[u8],
        filename_hint: &str,
    ) -> TurnResult {
        if audio.is_empty() {
            return Err(TurnError::Validation("empty audio payload".to_string()));
        }

        let extension = Path::new(filename_hint)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if extension.as_deref() != Some(self.accepted_format.as_str()) {
            return Err(TurnError::Validation(format!(
                "unsupported audio container in '{}': expected .{}",
                filename_hint, self.accepted_format
            )));
        }

        ctx.mark("validation", "input accepted");

        let input_path = self
            .cache_dir
            .join(format!("input_{}.{}", ctx.request_id, self.accepted_format));
        let _input = EphemeralFile::write(&input_path, audio)
            .map_err(|e| TurnError::Internal(format!("failed to stage input audio: {}", e)))?;

        ctx.mark("speech-to-text", "transcribing input audio");
        let transcript = self
            .transcriber
            .transcribe(&input_path, &self.accepted_format)
            .await
            .map_err(|e| TurnError::Upstream {
                stage: Stage::SpeechToText,
                message: e.to_string(),
            })?;

        ctx.mark("response-generation", "requesting assistant reply");
        let reply_text = self.responder.reply(session_id, &transcript).await?;

        ctx.mark("speech-synthesis", "synthesizing reply audio");
        let audio_path = self
            .synthesizer
            .synthesize(&reply_text)
            .await
            .map_err(|e| TurnError::Upstream {
                stage: Stage::SpeechSynthesis,
                message: e.to_string(),
            })?;

        // A reported success with no artifact behind it is an internal
        // fault, not something to hand to the caller.
        if !audio_path.exists() {
            return Err(TurnError::Internal(format!(
                "synthesized audio missing at {:?}",
                audio_path
            )));
        }

        let elapsed = ctx.elapsed_ms();
        ctx.mark("complete", &format!("turn finished in {} ms", elapsed));

        Ok(SynthesizedReply {
            audio_path,
            transcript,
            reply_text,
        })
    }
}
