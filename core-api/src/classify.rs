//! Pure classification of an envelope into a display-ready result.
//!
//! Classification never touches the session, the navigator or the event bus;
//! side effects belong to [`crate::dispatch`].

use serde::{Deserialize, Serialize};

use crate::envelope::ResponseEnvelope;
use crate::status::{resolve_user_message, SUCCESS_MESSAGE};

/// Normalized outcome of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Resolved display message.
    pub message: String,
    pub code: i32,
}

impl<T> Classification<T> {
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Classify a server reply. `None` means no reply was obtained and is
/// treated as [`ResponseEnvelope::network_failure`].
pub fn classify<T>(envelope: Option<ResponseEnvelope<T>>) -> Classification<T> {
    let envelope = envelope.unwrap_or_else(ResponseEnvelope::network_failure);
    let success = envelope.is_success();

    let message = if success {
        envelope
            .display_message()
            .unwrap_or(SUCCESS_MESSAGE)
            .to_string()
    } else {
        resolve_user_message(&envelope)
    };

    Classification {
        success,
        code: envelope.code,
        message,
        data: envelope.data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{StatusCode, NETWORK_ERROR_MESSAGE};
    use serde_json::{json, Value};

    #[test]
    fn test_absent_reply_equals_network_failure() {
        let absent = classify::<Value>(None);
        let synthetic = classify(Some(ResponseEnvelope::<Value>::new(
            500,
            Some(NETWORK_ERROR_MESSAGE.to_string()),
            None,
        )));

        assert_eq!(absent, synthetic);
        assert!(!absent.success);
        assert_eq!(absent.code, 500);
        assert_eq!(absent.message, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_success_with_empty_message() {
        let envelope = ResponseEnvelope::new(200, Some(String::new()), Some(json!({"id": 1})));
        let result = classify(Some(envelope));

        assert!(result.success);
        assert_eq!(result.code, 200);
        assert_eq!(result.data, Some(json!({"id": 1})));
        assert_eq!(result.message, SUCCESS_MESSAGE);
    }

    #[test]
    fn test_success_keeps_server_message() {
        let envelope = ResponseEnvelope::new(200, Some("Saved".to_string()), Some(1));
        assert_eq!(classify(Some(envelope)).message, "Saved");
    }

    #[test]
    fn test_failure_uses_user_message() {
        let envelope = ResponseEnvelope::<Value>::new(503, None, None);
        let result = classify(Some(envelope));

        assert!(result.is_failure());
        assert_eq!(result.message, StatusCode::ServiceUnavailable.user_message());
    }

    #[test]
    fn test_failure_passes_data_through() {
        let envelope = ResponseEnvelope::new(517, Some("name is required".into()), Some(json!(["name"])));
        let result = classify(Some(envelope));

        assert_eq!(result.message, "name is required");
        assert_eq!(result.data, Some(json!(["name"])));
    }
}
