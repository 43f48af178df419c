use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::interface::ChatCompletion;
use crate::history::{ConversationTurn, Role};

/// Gemini generateContent client.
///
/// The API only knows "user" and "model" roles, so the leading system
/// instruction travels as a user-role content, the same way the deployed
/// assistant seeds its chat session.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: String, model: String, api_key: String) -> Self {
        info!("Initialized GeminiClient: model={}, base_url={}", model, base_url);
        Self {
            client,
            base_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl ChatCompletion for GeminiClient {
    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String, anyhow::Error> {
        let contents: Vec<Value> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::Assistant => "model",
                    Role::User | Role::System => "user",
                };
                json!({
                    "role": role,
                    "parts": [{ "text": turn.content }]
                })
            })
            .collect();

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({ "contents": contents }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API returned {}: {}", status, body));
        }

        let body: Value = response.json().await?;
        let text = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| anyhow::anyhow!("No text candidate in Gemini response"))?;

        Ok(text.trim().to_string())
    }
}
