//! Custom error types for translation operations

use thiserror::Error;

use crate::core::retry::{classify, Retryability, TransientKind};

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Credential or setting missing/invalid
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },

    /// Rate limit exceeded (HTTP 429 or equivalent)
    #[error("Usage limit reached, please retry in about a minute ({message})")]
    RateLimited {
        message: String,
    },

    /// Upstream overloaded (HTTP 503 or equivalent)
    #[error("The AI service is temporarily unstable, please retry shortly ({message})")]
    Overloaded {
        message: String,
    },

    /// Empty body or body not decodable into the record list
    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
    },

    /// Any other failure reported by the network layer
    #[error("{message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// Batch rejected before contacting the service
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranslationError {
    /// Structured status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TranslationError::RateLimited { .. } => Some(429),
            TranslationError::Overloaded { .. } => Some(503),
            TranslationError::Service { status, .. } => *status,
            _ => None,
        }
    }

    /// Banner text for the Korean front-end.
    ///
    /// Transient kinds get a fixed localized hint; everything else is
    /// surfaced as-is.
    pub fn user_message(&self) -> String {
        match self {
            TranslationError::RateLimited { .. } => {
                "사용량이 많아 요청이 제한되었습니다. 잠시 후(약 1분 뒤) 다시 시도해주세요.".to_string()
            }
            TranslationError::Overloaded { .. } => {
                "AI 서비스가 일시적으로 불안정합니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Build an error from a transport status and message.
    ///
    /// 429 and 503 map to their dedicated variants. Without a status the
    /// message text is inspected for the same codes.
    pub fn from_status(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        match classify(status, &message) {
            Retryability::Transient(TransientKind::RateLimited) => {
                TranslationError::RateLimited { message }
            }
            Retryability::Transient(TransientKind::Overloaded) => {
                TranslationError::Overloaded { message }
            }
            Retryability::Terminal => TranslationError::Service { status, message },
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        // the URL may contain digits that look like status codes
        TranslationError::from_status(status, err.without_url().to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
