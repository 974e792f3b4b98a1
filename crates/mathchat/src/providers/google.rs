use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, ProviderResponse, Usage};
use super::configs::GoogleProviderConfig;
use super::unify::extract_tool_steps;
use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::role::Role;

pub struct GoogleProvider {
    client: Client,
    config: GoogleProviderConfig,
}

impl GoogleProvider {
    pub fn new(config: GoogleProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = match data.get("usageMetadata") {
            Some(usage) => usage,
            None => return Usage::default(),
        };

        Usage::new(
            usage
                .get("promptTokenCount")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32),
            usage
                .get("candidatesTokenCount")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32),
            usage
                .get("totalTokenCount")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32),
        )
    }

    // Gemini uses "model" where everyone else says "assistant"
    fn messages_to_gemini_spec(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                json!({
                    "role": role,
                    "parts": [{"text": message.content}]
                })
            })
            .collect()
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.host.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        );

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => {
                let status = response.status();
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<ProviderResponse> {
        let mut payload = json!({
            "systemInstruction": {"parts": [{"text": system}]},
            "contents": Self::messages_to_gemini_spec(messages)
        });

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = self.config.temperature {
            generation_config.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(tokens));
        }
        if !generation_config.is_empty() {
            payload
                .as_object_mut()
                .ok_or_else(|| anyhow!("payload must be an object"))?
                .insert(
                    "generationConfig".to_string(),
                    Value::Object(generation_config),
                );
        }

        let response = self.post(payload).await?;

        let parts = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|first| first.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "no candidates[0].content.parts in Gemini response".to_string(),
                )
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Self::get_usage(&response),
            tool_steps: extract_tool_steps(&response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_basic() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            {"text": "The answer "},
                            {"text": "is 42."}
                        ]
                    }
                }],
                "usageMetadata": {
                    "promptTokenCount": 7,
                    "candidatesTokenCount": 4,
                    "totalTokenCount": 11
                }
            })))
            .mount(&mock_server)
            .await;

        let provider = GoogleProvider::new(GoogleProviderConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: Some(0.3),
            max_tokens: Some(512),
        })?;

        let reply = provider
            .complete(
                "You are a helpful assistant.",
                &[Message::user("What is the answer?")],
            )
            .await?;

        assert_eq!(reply.message.content, "The answer is 42.");
        assert_eq!(reply.usage.total_tokens, Some(11));
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_missing_candidates() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let provider = GoogleProvider::new(GoogleProviderConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: None,
            max_tokens: None,
        })?;

        let result = provider
            .complete("You are a helpful assistant.", &[Message::user("hi")])
            .await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::MalformedResponse(_))
        ));
        Ok(())
    }
}
