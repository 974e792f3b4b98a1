use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a missing settings field back to the environment variable the operator
/// has to set. Missing-field errors only ever surface from the provider
/// section since everything else has defaults.
pub fn to_env_var(field: &str) -> String {
    format!(
        "MATHCHAT_PROVIDER__{}",
        field.replace('.', "__").to_uppercase()
    )
}
