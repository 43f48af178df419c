use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::interface::ChatCompletion;
use crate::error::{Stage, TurnError};
use crate::history::{ConversationTurn, HistoryStore, Role};

/// Conversational memory keyed by session id. A session's history is loaded
/// from the store the first time the session is touched, kept authoritative
/// in memory for the rest of the process's life, and persisted best-effort
/// after every successful exchange.
pub struct ResponseGenerator {
    llm: Arc<dyn ChatCompletion>,
    store: HistoryStore,
    system_instruction: String,
    sessions: DashMap<String, Vec<ConversationTurn>>,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<dyn ChatCompletion>, store: HistoryStore, system_instruction: String) -> Self {
        Self {
            llm,
            store,
            system_instruction,
            sessions: DashMap::new(),
        }
    }

    /// Produce the assistant reply for one transcript.
    ///
    /// On an empty history the fixed system instruction is injected as a
    /// synthetic leading turn, at most once per session lifetime. History is
    /// not touched when the provider call fails, so a failed turn leaves no
    /// trace in memory or on disk.
    pub async fn reply(&self, session_id: &str, transcript: &str) -> Result<String, TurnError> {
        let mut session = match self.sessions.get(session_id) {
            Some(entry) => entry.value().clone(),
            None => self.store.load(session_id),
        };

        if session.is_empty() {
            debug!(session_id, "Bootstrapping session with system instruction");
            session.push(ConversationTurn::new(
                Role::System,
                self.system_instruction.clone(),
            ));
        }

        session.push(ConversationTurn::new(Role::User, transcript));

        let reply = self
            .llm
            .complete(&session)
            .await
            .map_err(|e| TurnError::Upstream {
                stage: Stage::ResponseGeneration,
                message: e.to_string(),
            })?;

        session.push(ConversationTurn::new(Role::Assistant, reply.clone()));

        // Best-effort durability: the in-memory session stays authoritative
        // even if the write fails.
        if let Err(e) = self.store.save(session_id, &session) {
            warn!(session_id, "Failed to persist conversation history: {}", e);
        }

        self.sessions.insert(session_id.to_string(), session);

        Ok(reply)
    }
}
