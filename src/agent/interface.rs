use async_trait::async_trait;

use crate::history::ConversationTurn;

/// Interface for the conversational-response provider. The provider is
/// stateless: the full ordered history is replayed on every call and the
/// reply for the final user turn comes back as plain text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String, anyhow::Error>;
}
