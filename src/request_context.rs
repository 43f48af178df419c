use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Per-request correlation data. Created when a turn enters the
/// orchestrator, discarded when the response leaves; never persisted.
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub started_at: DateTime<Utc>,
    trail: Vec<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            trail: Vec::new(),
        }
    }

    /// Record a stage transition: one correlated log line plus an in-memory
    /// trail entry for post-hoc inspection.
    pub fn mark(&mut self, stage: &str, detail: &str) {
        tracing::info!(request_id = %self.request_id, stage, "{}", detail);
        self.trail
            .push(format!("{} [{}] {}", Utc::now().to_rfc3339(), stage, detail));
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    pub fn trail(&self) -> &[String] {
        &self.trail
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
