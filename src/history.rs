use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One exchange entry. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("failed to write history file: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

fn is_safe_session_id(session_id: &str) -> bool {
    if session_id.is_empty() || session_id.len() > 128 {
        return false;
    }

    let pattern = Regex::new(r"^[\w\-]+$").unwrap();
    pattern.is_match(session_id)
}

/// Durable store for conversation histories, one JSON file per session id
/// under a single directory. Reads are defensive: a missing, empty, or
/// malformed file degrades to an empty history so a session always starts.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn session_path(&self, session_id: &str) -> Result<PathBuf, PersistenceError> {
        let safe = Path::new(session_id)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PersistenceError::InvalidSessionId(session_id.to_string()))?;

        if safe != session_id || !is_safe_session_id(safe) {
            return Err(PersistenceError::InvalidSessionId(session_id.to_string()));
        }

        let full_path = self.dir.join(format!("{}.json", safe));

        // Ensure path stays within the store directory (prevent path traversal)
        if !full_path.starts_with(&self.dir) {
            return Err(PersistenceError::InvalidSessionId(session_id.to_string()));
        }

        Ok(full_path)
    }

    pub fn load(&self, session_id: &str) -> Vec<ConversationTurn> {
        let path = match self.session_path(session_id) {
            Ok(p) => p,
            Err(e) => {
                warn!("Refusing to load history: {}", e);
                return Vec::new();
            }
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str(&content) {
            Ok(turns) => turns,
            Err(e) => {
                warn!("Corrupt history file {:?}, starting empty: {}", path, e);
                Vec::new()
            }
        }
    }

    /// Whole-file replace; no incremental append, so a crashed write never
    /// leaves a half-appended list behind.
    pub fn save(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<(), PersistenceError> {
        let path = self.session_path(session_id)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(turns)?)?;
        debug!("Persisted {} turns to {:?}", turns.len(), path);
        Ok(())
    }
}
