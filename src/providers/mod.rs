// LLM provider support
//
// The agent talks to the model through the `LlmProvider` trait so the
// OpenAI-compatible HTTP client can be swapped for a scripted provider in
// tests.

use anyhow::Result;
use async_trait::async_trait;

pub mod openai;
pub mod retry;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use openai::OpenAIProvider;
pub use retry::{with_retry, RetryPolicy};
pub use types::{Message, ProviderRequest, ProviderResponse};

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a request and wait for the complete response
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Provider name (e.g. "groq", "openai")
    fn name(&self) -> &str;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;
}

/// Stands in when no API key is configured; every request fails with `reason`
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    async fn send_message(&self, _request: &ProviderRequest) -> Result<ProviderResponse> {
        anyhow::bail!("{}", self.reason)
    }

    fn name(&self) -> &str {
        "unconfigured"
    }

    fn default_model(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_provider_fails_with_reason() {
        let provider = UnconfiguredProvider::new("GROQ_API_KEY is not set");
        let err = provider
            .send_message(&ProviderRequest::prompt("system", "user"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GROQ_API_KEY is not set");
        assert_eq!(provider.name(), "unconfigured");
    }
}
