/*
[INPUT]:  Error sources (HTTP, API, serialization, server rejections)
[OUTPUT]: Structured error types with user-facing messages
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the TaskR client
#[derive(Error, Debug)]
pub enum TaskrError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Server answered `success: false`
    #[error("Request rejected: {message}")]
    Rejected { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Task is not known to the client
    #[error("Task {task_id} not found")]
    NotFound { task_id: i64 },
}

impl TaskrError {
    /// Transport-level failure (no usable answer from the server)
    pub fn is_network(&self) -> bool {
        matches!(self, TaskrError::Http(_))
    }

    /// Short message suitable for a transient notice
    pub fn user_message(&self) -> String {
        match self {
            TaskrError::Http(err) => format!("Network error: {err}"),
            TaskrError::Rejected { message } => message.clone(),
            TaskrError::Api { code, .. } => format!("Server error ({code})"),
            other => other.to_string(),
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TaskrError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Rejection with the server's message, or a generic one when it sent none
    pub fn rejected(message: Option<String>, fallback: &str) -> Self {
        TaskrError::Rejected {
            message: message
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// Result type alias for TaskR client operations
pub type Result<T> = std::result::Result<T, TaskrError>;
