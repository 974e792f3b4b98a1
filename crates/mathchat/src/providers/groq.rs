use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, ProviderResponse, Usage};
use super::configs::GroqProviderConfig;
use super::unify::{extract_text, extract_tool_steps, messages_to_chat_spec};
use crate::models::message::Message;

/// Groq serves an OpenAI-compatible chat-completions API under its own host.
pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(600)).build()?;
        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = match data.get("usage") {
            Some(usage) => usage,
            None => return Usage::default(),
        };
        Usage::new(
            usage
                .get("prompt_tokens")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32),
            usage
                .get("completion_tokens")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32),
            usage
                .get("total_tokens")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32),
        )
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(anyhow!("Groq request failed: {}", status)),
        }
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<ProviderResponse> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_chat_spec(system, messages)
        });

        if let Some(temp) = self.config.temperature {
            payload
                .as_object_mut()
                .ok_or_else(|| anyhow!("payload must be an object"))?
                .insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload
                .as_object_mut()
                .ok_or_else(|| anyhow!("payload must be an object"))?
                .insert("max_tokens".to_string(), json!(tokens));
        }

        let response = self.post(payload).await?;
        if let Some(error) = response.get("error") {
            return Err(anyhow!("Groq API error: {}", error));
        }

        Ok(ProviderResponse {
            message: Message::assistant(extract_text(&response)),
            usage: Self::get_usage(&response),
            tool_steps: extract_tool_steps(&response),
        })
    }
}
