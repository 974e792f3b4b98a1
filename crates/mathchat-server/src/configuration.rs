use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use mathchat::providers::configs::{
    self, AnthropicProviderConfig, GoogleProviderConfig, GroqProviderConfig, OpenAiProviderConfig,
    ProviderConfig, XaiProviderConfig,
};
use mathchat::search::exa::{ExaConfig, EXA_HOST};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Anthropic {
        #[serde(default = "default_anthropic_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Google {
        #[serde(default = "default_google_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_google_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Groq {
        #[serde(default = "default_groq_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_groq_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Xai {
        #[serde(default = "default_xai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_xai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    // Convert to the mathchat ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Anthropic {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Anthropic(AnthropicProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Google {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Google(GoogleProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Groq {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Groq(GroqProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Xai {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Xai(XaiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub exa_api_key: Option<String>,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            exa_api_key: None,
            num_results: default_num_results(),
        }
    }
}

impl SearchSettings {
    pub fn into_config(self) -> Option<ExaConfig> {
        self.exa_api_key.map(|api_key| ExaConfig {
            host: EXA_HOST.to_string(),
            api_key,
            num_results: self.num_results,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("MATHCHAT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Surface missing fields as the environment variable the operator has
        // to set, not a serde path
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `type`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches("`");
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_num_results() -> u32 {
    5
}

fn default_openai_host() -> String {
    configs::OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    configs::OPENAI_DEFAULT_MODEL.to_string()
}

fn default_anthropic_host() -> String {
    configs::ANTHROPIC_HOST.to_string()
}

fn default_anthropic_model() -> String {
    configs::ANTHROPIC_DEFAULT_MODEL.to_string()
}

fn default_google_host() -> String {
    configs::GOOGLE_HOST.to_string()
}

fn default_google_model() -> String {
    configs::GOOGLE_DEFAULT_MODEL.to_string()
}

fn default_groq_host() -> String {
    configs::GROQ_HOST.to_string()
}

fn default_groq_model() -> String {
    configs::GROQ_DEFAULT_MODEL.to_string()
}

fn default_xai_host() -> String {
    configs::XAI_HOST.to_string()
}

fn default_xai_model() -> String {
    configs::XAI_DEFAULT_MODEL.to_string()
}
