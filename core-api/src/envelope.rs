//! Uniform `{code, message, data}` wrapper returned by every endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::{StatusCode, NETWORK_ERROR_MESSAGE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = Value> {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn new(code: i32, message: Option<String>, data: Option<T>) -> Self {
        Self {
            code,
            message,
            data,
        }
    }

    pub fn success(data: T) -> Self {
        Self::new(StatusCode::Success.code(), None, Some(data))
    }

    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, Some(message.into()), None)
    }

    /// Stand-in for a reply that never arrived.
    pub fn network_failure() -> Self {
        Self::new(
            StatusCode::InternalServerError.code(),
            Some(NETWORK_ERROR_MESSAGE.to_string()),
            None,
        )
    }

    pub fn is_success(&self) -> bool {
        self.code == StatusCode::Success.code()
    }

    /// The server message, unless absent or empty.
    pub fn display_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|message| !message.is_empty())
    }

    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            code: self.code,
            message: self.message,
            data: self.data.map(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_are_none() {
        let envelope: ResponseEnvelope = serde_json::from_str(r#"{"code":401}"#).unwrap();
        assert_eq!(envelope.code, 401);
        assert_eq!(envelope.message, None);
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_null_data_is_none() {
        let envelope: ResponseEnvelope<Vec<i64>> =
            serde_json::from_value(json!({"code": 200, "message": "ok", "data": null})).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_typed_data() {
        let envelope: ResponseEnvelope<String> =
            serde_json::from_value(json!({"code": 200, "message": "", "data": "task-1"})).unwrap();
        assert_eq!(envelope.data.as_deref(), Some("task-1"));
        assert_eq!(envelope.display_message(), None);
    }

    #[test]
    fn test_network_failure_shape() {
        let envelope = ResponseEnvelope::<Value>::network_failure();
        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        assert!(!envelope.is_success());
    }
}
