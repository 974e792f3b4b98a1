use anyhow::Result;
use strum_macros::EnumIter;

use super::{
    anthropic::AnthropicProvider, base::Provider, configs::ProviderConfig, google::GoogleProvider,
    groq::GroqProvider, openai::OpenAiProvider, xai::XaiProvider,
};

#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
    Anthropic,
    Google,
    Groq,
    Xai,
}

impl ProviderType {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Google => "google",
            ProviderType::Groq => "groq",
            ProviderType::Xai => "xai",
        }
    }

    /// Models known to work with this provider. Static configuration handed to
    /// callers, not consulted when building requests: any model name a config
    /// carries is passed through to the API as-is.
    pub fn known_models(&self) -> &'static [&'static str] {
        match self {
            ProviderType::OpenAi => &["gpt-4o", "gpt-4o-mini", "o1", "o1-mini"],
            ProviderType::Anthropic => &[
                "claude-3-5-sonnet-20241022",
                "claude-3-5-haiku-20241022",
                "claude-3-opus-20240229",
            ],
            ProviderType::Google => &["gemini-2.0-flash", "gemini-1.5-pro", "gemini-1.5-flash"],
            ProviderType::Groq => &[
                "llama-3.3-70b-versatile",
                "llama-3.1-8b-instant",
                "mixtral-8x7b-32768",
            ],
            ProviderType::Xai => &["grok-2-latest", "grok-beta"],
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
        ProviderConfig::Google(google_config) => Ok(Box::new(GoogleProvider::new(google_config)?)),
        ProviderConfig::Groq(groq_config) => Ok(Box::new(GroqProvider::new(groq_config)?)),
        ProviderConfig::Xai(xai_config) => Ok(Box::new(XaiProvider::new(xai_config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::OpenAiProviderConfig;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_provider_has_models() {
        for provider_type in ProviderType::iter() {
            assert!(!provider_type.known_models().is_empty());
            assert!(!provider_type.name().is_empty());
        }
    }

    #[test]
    fn test_get_provider_openai() {
        let config = ProviderConfig::OpenAi(OpenAiProviderConfig {
            host: "https://api.openai.com".to_string(),
            api_key: "test".to_string(),
            model: "gpt-4o".to_string(),
            temperature: None,
            max_tokens: None,
        });
        assert!(get_provider(config).is_ok());
    }
}
