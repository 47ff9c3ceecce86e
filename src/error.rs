// HTTP client error types
use serde_json::Value;
use thiserror::Error;

/// Failure talking to the case management backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Request never produced a response (DNS, TLS, connection reset, timeout)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the shape we expected
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Build a status error the same way for every endpoint: prefer the
    /// server's `message` field, otherwise fall back to the status code.
    pub fn from_status(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({})", status));

        ApiError::Status { status, message, body }
    }

    /// HTTP status code, if the server responded at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
        }
    }

    pub fn is_bad_request(&self) -> bool {
        self.status_code() == Some(400)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Get error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self.status_code() {
            Some(400) => "BAD_REQUEST",
            Some(401) => "UNAUTHORIZED",
            Some(403) => "FORBIDDEN",
            Some(404) => "NOT_FOUND",
            Some(409) => "CONFLICT",
            Some(422) => "UNPROCESSABLE_ENTITY",
            Some(429) => "TOO_MANY_REQUESTS",
            Some(s) if s >= 500 => "SERVER_ERROR",
            Some(_) => "HTTP_ERROR",
            None => match self {
                ApiError::Decode(_) => "INVALID_RESPONSE",
                ApiError::InvalidUrl(_) => "INVALID_URL",
                _ => "NETWORK_ERROR",
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
