use anyhow::Result;
use std::env;

use crate::errors::ProviderError;

/// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
    Google(GoogleProviderConfig),
    Groq(GroqProviderConfig),
    Xai(XaiProviderConfig),
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct GoogleProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct XaiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const GOOGLE_HOST: &str = "https://generativelanguage.googleapis.com";
pub const GOOGLE_DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const GROQ_HOST: &str = "https://api.groq.com/openai";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const XAI_HOST: &str = "https://api.x.ai";
pub const XAI_DEFAULT_MODEL: &str = "grok-2-latest";

/// Helper to read environment variables with an optional default
fn get_env(key: &str, default: Option<&str>) -> Option<String> {
    env::var(key).ok().or_else(|| default.map(String::from))
}

fn require_env(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| ProviderError::MissingCredentials(format!("{} is not set", key)).into())
}

impl OpenAiProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: get_env("OPENAI_HOST", Some(OPENAI_HOST)).unwrap_or_default(),
            api_key: require_env("OPENAI_API_KEY")?,
            model: get_env("OPENAI_MODEL", Some(OPENAI_DEFAULT_MODEL)).unwrap_or_default(),
            temperature: None,
            max_tokens: None,
        })
    }
}

impl AnthropicProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: get_env("ANTHROPIC_HOST", Some(ANTHROPIC_HOST)).unwrap_or_default(),
            api_key: require_env("ANTHROPIC_API_KEY")?,
            model: get_env("ANTHROPIC_MODEL", Some(ANTHROPIC_DEFAULT_MODEL)).unwrap_or_default(),
            temperature: None,
            max_tokens: None,
        })
    }
}

impl GoogleProviderConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GOOGLE_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .map_err(|_| {
                ProviderError::MissingCredentials(
                    "GOOGLE_API_KEY or GEMINI_API_KEY is not set".to_string(),
                )
            })?;
        Ok(Self {
            host: get_env("GOOGLE_HOST", Some(GOOGLE_HOST)).unwrap_or_default(),
            api_key,
            model: get_env("GOOGLE_MODEL", Some(GOOGLE_DEFAULT_MODEL)).unwrap_or_default(),
            temperature: None,
            max_tokens: None,
        })
    }
}

impl GroqProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: get_env("GROQ_HOST", Some(GROQ_HOST)).unwrap_or_default(),
            api_key: require_env("GROQ_API_KEY")?,
            model: get_env("GROQ_MODEL", Some(GROQ_DEFAULT_MODEL)).unwrap_or_default(),
            temperature: None,
            max_tokens: None,
        })
    }
}

impl XaiProviderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: get_env("XAI_HOST", Some(XAI_HOST)).unwrap_or_default(),
            api_key: require_env("XAI_API_KEY")?,
            model: get_env("XAI_MODEL", Some(XAI_DEFAULT_MODEL)).unwrap_or_default(),
            temperature: None,
            max_tokens: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_typed() {
        env::remove_var("XAI_API_KEY");
        let err = XaiProviderConfig::from_env().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::MissingCredentials(_))
        ));
    }
}
