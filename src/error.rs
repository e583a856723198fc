//! Error handling for the warehouse client

use std::fmt;
use thiserror::Error;

/// Structured error payload returned by the data API on failure.
///
/// PostgREST reports failures as a JSON object with optional `code`,
/// `message`, `details` and `hint` fields; all four are kept so callers can
/// surface the most specific text available.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// Wrap a raw, unparseable response body.
    pub(crate) fn from_text(text: String) -> Self {
        Self {
            message: Some(text),
            ..Self::default()
        }
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if let Some(details) = &self.details {
            parts.push(format!("details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("hint: {}", hint));
        }
        if parts.is_empty() {
            parts.push("no error detail".to_string());
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Unified error type for the warehouse client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The backend rejected the request
    #[error("API error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: ApiErrorBody,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Database query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration errors; nothing was sent over the network
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation that needs a signed-in session was called without one
    #[error("Not signed in")]
    MissingSession,

    /// The session's role does not permit the operation
    #[error("Operation requires the owner role")]
    Forbidden,

    /// Caller-supplied input was rejected before any remote call
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new invalid-input error
    pub fn invalid_input<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidInput(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_body_display_joins_available_fields() {
        let body = ApiErrorBody {
            code: Some("23503".to_string()),
            message: Some("foreign key violation".to_string()),
            details: None,
            hint: Some("check truck_id".to_string()),
        };
        let rendered = body.to_string();
        assert!(rendered.contains("23503"));
        assert!(rendered.contains("foreign key violation"));
        assert!(rendered.contains("check truck_id"));
    }

    #[test]
    fn api_error_body_display_never_empty() {
        assert_eq!(ApiErrorBody::default().to_string(), "no error detail");
    }
}
