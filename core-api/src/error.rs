use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised below the classification layer.
///
/// A server that answers with an envelope never produces an `ApiError`, no
/// matter what code the envelope carries; the code is interpreted by
/// [`crate::classify`] and [`crate::dispatch`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// No reply was obtained (connection refused, timeout, aborted body).
    #[error("Transport error: {0}")]
    Transport(#[source] BridgeError),

    /// The server replied with a non-2xx status and no envelope.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 429 on a download endpoint.
    #[error("Daily download quota exhausted")]
    QuotaExceeded,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// A background task did not finish within the polling budget.
    #[error("Task {task_id} still {state} after {attempts} polls")]
    TaskTimedOut {
        task_id: String,
        state: String,
        attempts: u32,
    },
}

impl ApiError {
    /// True when no server reply was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// HTTP status of the reply, if one was obtained.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::QuotaExceeded => Some(429),
            _ => None,
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        ApiError::InvalidUrl(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::Status {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 502: Bad Gateway");
        assert_eq!(error.http_status(), Some(502));
    }

    #[test]
    fn test_transport_classification() {
        let error = ApiError::Transport(BridgeError::Timeout(20_000));
        assert!(error.is_transport());
        assert_eq!(error.http_status(), None);
        assert!(!ApiError::QuotaExceeded.is_transport());
    }
}
