//! LLM runtime client
//!
//! Stateless bridge to the local LLM runtime: single-shot completions with
//! fixed sampling parameters, and the installed-model listing. Both degrade
//! gracefully when the runtime is offline: the chat surface falls back to
//! canned replies, the model list to a fixed set.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Models offered when the runtime cannot be reached.
pub const FALLBACK_MODELS: [&str; 4] = ["gemma", "llama2", "mistral", "codellama"];

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Single-shot completion, non-streaming, fixed sampling parameters and
    /// context window. Bounded by the configured hard deadline.
    #[tracing::instrument(skip(self, prompt), fields(model = %model))]
    pub async fn generate(&self, model: &str, prompt: &str) -> EngineResult<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(&serde_json::json!({
                "model": model,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "temperature": 0.7,
                    "top_p": 0.9,
                    "num_ctx": 1024
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Unavailable(format!(
                "Runtime responded with {}",
                response.status()
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(data
            .response
            .unwrap_or_else(|| "Sorry, I could not generate a response.".to_string()))
    }

    /// Best-effort reachability probe.
    pub async fn is_available(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Names of the models installed on the runtime.
    pub async fn list_models(&self) -> EngineResult<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Unavailable(format!(
                "Runtime responded with {}",
                response.status()
            )));
        }

        let data: TagsResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(data.models.into_iter().map(|m| m.name).collect())
    }
}

/// Canned reply used when the runtime is unreachable. Pattern-matched on
/// the message so the conversation stays coherent offline.
pub fn fallback_reply(message: &str) -> String {
    const DEFAULTS: [&str; 4] = [
        "Hello! I'm a helpful AI assistant. How can I help you today?",
        "That's an interesting question! I'm here to assist with various tasks and answer questions.",
        "Great question! What specific topic interests you?",
        "I'd be happy to help you with that! Could you tell me more about what you're looking for?",
    ];

    let lower = message.to_lowercase();
    if lower.contains("hello") || lower.contains("hi") {
        "Hello! Nice to meet you. I'm ready to help!".to_string()
    } else if lower.contains("how are you") {
        "I'm doing great! As an AI, I'm always ready to assist. How are you doing?".to_string()
    } else if lower.contains("image") {
        "I see you're working with the image studio! Would you like ideas for images to generate?"
            .to_string()
    } else if lower.contains("thank") {
        "You're welcome! Is there anything else you'd like to know?".to_string()
    } else if lower.contains("bye") || lower.contains("goodbye") {
        "Goodbye! It was nice chatting with you. Feel free to come back anytime!".to_string()
    } else {
        DEFAULTS[rand::random::<u32>() as usize % DEFAULTS.len()].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_reply_patterns() {
        assert!(fallback_reply("hello there").contains("Nice to meet you"));
        assert!(fallback_reply("Hi!").contains("Nice to meet you"));
        assert!(fallback_reply("how are you?").contains("doing great"));
        assert!(fallback_reply("thank you so much").contains("welcome"));
        assert!(fallback_reply("ok goodbye").contains("Goodbye"));
        assert!(fallback_reply("make me an image").contains("image studio"));
    }

    #[test]
    fn test_fallback_reply_always_nonempty() {
        assert!(!fallback_reply("completely unrelated text").is_empty());
    }

    #[tokio::test]
    async fn test_offline_runtime_is_unavailable() {
        let client = OllamaClient::new("http://127.0.0.1:1", Duration::from_secs(1));
        let result = client.list_models().await;
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }
}
