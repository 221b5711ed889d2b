// Provider-agnostic request/response types

use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Unified request format for all providers
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub messages: Vec<Message>,

    /// Model name; empty means the provider default
    pub model: String,

    pub max_tokens: u32,

    /// Sent as a leading {"role":"system"} message by OpenAI-compatible providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ProviderRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system: None,
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }

    /// Single-turn request: system prompt plus one user message
    pub fn prompt(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(vec![Message::user(user)]).with_system(system)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Unified response format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    /// Assistant text (empty when the model returned none)
    pub text: String,
    pub stop_reason: Option<String>,
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_builder_defaults() {
        let req = ProviderRequest::prompt("sys", "hello");
        assert_eq!(req.system.as_deref(), Some("sys"));
        assert_eq!(req.messages, vec![Message::user("hello")]);
        assert_eq!(req.max_tokens, 2000);
        assert_eq!(req.temperature, Some(0.3));
        assert!(req.model.is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let req = ProviderRequest::prompt("sys", "hi")
            .with_model("llama-3.1-8b-instant")
            .with_max_tokens(500)
            .with_temperature(0.7);
        assert_eq!(req.model, "llama-3.1-8b-instant");
        assert_eq!(req.max_tokens, 500);
        assert_eq!(req.temperature, Some(0.7));
    }
}
