use thiserror::Error;

/// Failures crossing the remote store boundary.
///
/// `Clone` so that one failed in-flight fetch can be handed to every reader
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode store response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            status: 403,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
