use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::providers::base::{Provider, ProviderResponse, Usage};

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<ProviderResponse>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }

    /// Convenience constructor for plain text replies
    pub fn with_texts(texts: Vec<&str>) -> Self {
        Self::new(
            texts
                .into_iter()
                .map(|text| ProviderResponse {
                    message: Message::assistant(text),
                    usage: Usage::default(),
                    tool_steps: Vec::new(),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _system: &str, _messages: &[Message]) -> Result<ProviderResponse> {
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| anyhow::anyhow!("mock provider lock poisoned"))?;
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(ProviderResponse {
                message: Message::assistant(""),
                usage: Usage::default(),
                tool_steps: Vec::new(),
            })
        } else {
            Ok(responses.remove(0))
        }
    }
}
