use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Context length exceeded. Message: {0}")]
    ContextLengthExceeded(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
