use std::time::Duration;

/// Failures of a single call to the generative provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider error: {0}")]
    Api(String),
    #[error("malformed provider payload: {0}")]
    Malformed(String),
    #[error("provider reply too short ({0} characters)")]
    TooShort(usize),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport(_) | ProviderError::Timeout(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Api(_) | ProviderError::Malformed(_) | ProviderError::TooShort(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Errors raised while reading a chat request.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}
