use std::time::Duration;

use jugglegraph_state::StateError;

/// Used when a 429 response has no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Too many requests. Please try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("engine request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("failed to decode engine response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    InvalidState(#[from] StateError),
}

impl EngineError {
    /// Server errors and network failures may succeed on a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Status { status, .. } => *status >= 500,
            EngineError::Network(_) => true,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            EngineError::RateLimited { .. } => Some(429),
            EngineError::Status { status, .. } => Some(*status),
            EngineError::Network(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            EngineError::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

/// Builds the error for a non-success response.
///
/// A JSON body with an `error` field supplies the message; otherwise the raw
/// body does, and an empty body falls back to a generic message.
pub fn error_from_response(status: u16, retry_after: Option<&str>, body: &str) -> EngineError {
    if status == 429 {
        let retry_after_secs = retry_after
            .and_then(parse_leading_secs)
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return EngineError::RateLimited { retry_after_secs };
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|error| error.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("Request failed with status {status}")
            } else {
                body.to_string()
            }
        });
    EngineError::Status { status, message }
}

fn parse_leading_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    let digits = value
        .char_indices()
        .take_while(|(_, ch)| ch.is_ascii_digit())
        .last()
        .map(|(idx, ch)| idx + ch.len_utf8())?;
    value[..digits].parse().ok()
}
