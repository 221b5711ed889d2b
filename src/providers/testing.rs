// Scripted provider for unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{LlmProvider, ProviderRequest, ProviderResponse};

/// Replies with canned text in order and records every request
pub(crate) struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ProviderRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn last_user_prompt(&self) -> String {
        self.seen.lock().unwrap().last().unwrap().messages[0].content.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.seen.lock().unwrap().push(request.clone());
        let text = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))?;
        Ok(ProviderResponse {
            id: "test".into(),
            model: "scripted".into(),
            text,
            stop_reason: Some("stop".into()),
            provider: "scripted".into(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}
