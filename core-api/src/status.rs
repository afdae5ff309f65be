//! # Status Code Taxonomy
//!
//! The server answers every call with a numeric business code. This module is
//! the single table mapping each code to two texts:
//!
//! - a *default message*, which is what the server itself sends when it has
//!   nothing more specific to say
//! - a *user message*, which is what the UI shows
//!
//! A server message only replaces the user message when it carries
//! information, i.e. when it is non-empty and differs from the default.
//!
//! ## Ranges
//!
//! | Range   | Family                                  |
//! |---------|-----------------------------------------|
//! | 200     | success                                 |
//! | 4xx     | client errors (400/401/403/404/409/429) |
//! | 500-505 | generic server errors                   |
//! | 510-521 | infrastructure errors                   |
//! | 530-549 | map service errors                      |
//! | 599     | unknown                                 |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::envelope::ResponseEnvelope;

/// Default message for a code missing from the table.
pub const UNKNOWN_DEFAULT_MESSAGE: &str = "Unknown error";

/// User message for a code missing from the table.
pub const UNKNOWN_USER_MESSAGE: &str = "Unknown error, please contact technical support";

/// Message of the envelope synthesized when no server reply was obtained.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again later";

/// Message shown for a successful call whose envelope carries none.
pub const SUCCESS_MESSAGE: &str = "Operation successful";

/// Every business code the server can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum StatusCode {
    Success = 200,

    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    TooManyRequests = 429,

    InternalServerError = 500,
    ServiceUnavailable = 503,
    GatewayTimeout = 504,
    HttpVersionNotSupported = 505,

    DatabaseError = 510,
    DatabaseOperationFailed = 511,
    CacheError = 512,
    FileSystemError = 513,
    NetworkError = 514,
    ThirdPartyServiceError = 515,
    BusinessLogicError = 516,
    DataValidationError = 517,
    PermissionError = 518,
    ConfigurationError = 519,
    ResourceExhausted = 520,
    SystemMaintenance = 521,

    MapConnectionError = 530,
    MapServiceUnavailable = 531,
    MapWorkspaceError = 532,
    MapDatastoreError = 533,
    MapLayerError = 534,
    MapStyleError = 535,
    MapWmsError = 536,
    MapWfsError = 537,
    MapWcsError = 538,
    MapAuthError = 539,
    MapPermissionError = 540,
    MapDataFormatError = 541,
    MapCrsError = 542,
    MapTileError = 543,
    MapPublishError = 544,
    MapConfigError = 545,
    MapTimeoutError = 546,
    MapResourceNotFound = 547,
    MapProcessingError = 548,
    MapUnknownError = 549,

    UnknownError = 599,
}

impl StatusCode {
    pub const ALL: [StatusCode; 44] = [
        StatusCode::Success,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::Conflict,
        StatusCode::TooManyRequests,
        StatusCode::InternalServerError,
        StatusCode::ServiceUnavailable,
        StatusCode::GatewayTimeout,
        StatusCode::HttpVersionNotSupported,
        StatusCode::DatabaseError,
        StatusCode::DatabaseOperationFailed,
        StatusCode::CacheError,
        StatusCode::FileSystemError,
        StatusCode::NetworkError,
        StatusCode::ThirdPartyServiceError,
        StatusCode::BusinessLogicError,
        StatusCode::DataValidationError,
        StatusCode::PermissionError,
        StatusCode::ConfigurationError,
        StatusCode::ResourceExhausted,
        StatusCode::SystemMaintenance,
        StatusCode::MapConnectionError,
        StatusCode::MapServiceUnavailable,
        StatusCode::MapWorkspaceError,
        StatusCode::MapDatastoreError,
        StatusCode::MapLayerError,
        StatusCode::MapStyleError,
        StatusCode::MapWmsError,
        StatusCode::MapWfsError,
        StatusCode::MapWcsError,
        StatusCode::MapAuthError,
        StatusCode::MapPermissionError,
        StatusCode::MapDataFormatError,
        StatusCode::MapCrsError,
        StatusCode::MapTileError,
        StatusCode::MapPublishError,
        StatusCode::MapConfigError,
        StatusCode::MapTimeoutError,
        StatusCode::MapResourceNotFound,
        StatusCode::MapProcessingError,
        StatusCode::MapUnknownError,
        StatusCode::UnknownError,
    ];

    pub fn from_code(code: i32) -> Option<StatusCode> {
        StatusCode::ALL.into_iter().find(|status| status.code() == code)
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn family(self) -> StatusFamily {
        StatusFamily::of(self.code())
    }

    /// Text the server uses when it has nothing more specific to say.
    pub fn default_message(self) -> &'static str {
        self.messages().0
    }

    /// Text shown to the user.
    pub fn user_message(self) -> &'static str {
        self.messages().1
    }

    fn messages(self) -> (&'static str, &'static str) {
        use StatusCode::*;
        match self {
            Success => ("Operation successful", "Operation successful"),

            BadRequest => ("Bad request", "Invalid request parameters, please check your input"),
            Unauthorized => ("Unauthorized", "Please log in first"),
            Forbidden => ("Forbidden", "Insufficient permissions to perform this operation"),
            NotFound => ("Resource not found", "The requested resource does not exist"),
            Conflict => ("Conflict", "Data conflict, please check your input"),
            TooManyRequests => ("Too many requests", "Too many requests, please try again later"),

            InternalServerError => (
                "Internal server error",
                "Server error, please try again later",
            ),
            ServiceUnavailable => (
                "Service unavailable",
                "Service temporarily unavailable, please try again later",
            ),
            GatewayTimeout => ("Gateway timeout", "Gateway timeout, please try again later"),
            HttpVersionNotSupported => (
                "HTTP version not supported",
                "HTTP version not supported",
            ),

            DatabaseError => (
                "Database error",
                "Database connection error, please try again later",
            ),
            DatabaseOperationFailed => (
                "Database operation failed",
                "Database operation failed",
            ),
            CacheError => ("Cache service error", "Cache service error, please try again later"),
            FileSystemError => ("File system error", "File system error, please try again later"),
            NetworkError => (
                "Network connection error",
                "Network connection error, please check your network settings",
            ),
            ThirdPartyServiceError => (
                "Third-party service error",
                "Third-party service temporarily unavailable, please try again later",
            ),
            BusinessLogicError => ("Business logic error", "Business logic processing error"),
            DataValidationError => ("Data validation error", "Data validation failed"),
            PermissionError => ("Permission verification error", "Permission verification failed"),
            ConfigurationError => (
                "System configuration error",
                "System configuration error, please contact the administrator",
            ),
            ResourceExhausted => (
                "Insufficient system resources",
                "Insufficient system resources, please try again later",
            ),
            SystemMaintenance => (
                "System under maintenance",
                "System under maintenance, please try again later",
            ),

            MapConnectionError => (
                "Map server connection error",
                "Failed to connect to the map service, please check your network connection",
            ),
            MapServiceUnavailable => (
                "Map server service unavailable",
                "Map service temporarily unavailable, please try again later",
            ),
            MapWorkspaceError => (
                "Map server workspace error",
                "Map workspace misconfigured, please contact the administrator",
            ),
            MapDatastoreError => (
                "Map server datastore error",
                "Failed to connect to the map datastore, please try again later",
            ),
            MapLayerError => (
                "Map server layer error",
                "Failed to load the map layer, please refresh the page and try again",
            ),
            MapStyleError => (
                "Map server style error",
                "Map style misconfigured, please contact the administrator",
            ),
            MapWmsError => (
                "Map server WMS service error",
                "Map service request failed, please try again later",
            ),
            MapWfsError => (
                "Map server WFS service error",
                "Map feature service request failed, please try again later",
            ),
            MapWcsError => (
                "Map server WCS service error",
                "Map coverage service request failed, please try again later",
            ),
            MapAuthError => (
                "Map server authentication error",
                "Map service authentication failed, please check your login status",
            ),
            MapPermissionError => (
                "Map server permission error",
                "Insufficient map service permissions, please contact the administrator",
            ),
            MapDataFormatError => (
                "Map server data format error",
                "Unsupported map data format, please check the data format",
            ),
            MapCrsError => (
                "Map server coordinate system error",
                "Map coordinate system misconfigured, please contact the administrator",
            ),
            MapTileError => (
                "Map server tile service error",
                "Failed to load map tiles, please refresh the page and try again",
            ),
            MapPublishError => (
                "Map server publish error",
                "Failed to publish map data, please try again later",
            ),
            MapConfigError => (
                "Map server configuration error",
                "Map service misconfigured, please contact the administrator",
            ),
            MapTimeoutError => (
                "Map server timeout error",
                "Map service request timed out, please try again later",
            ),
            MapResourceNotFound => (
                "Map server resource not found",
                "Map resource does not exist, please check the resource path",
            ),
            MapProcessingError => (
                "Map server processing error",
                "Failed to process map data, please try again later",
            ),
            MapUnknownError => (
                "Map server unknown error",
                "Unknown map service error, please contact technical support",
            ),

            UnknownError => ("Unknown error", UNKNOWN_USER_MESSAGE),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.default_message())
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        StatusCode::from_code(code).ok_or(code)
    }
}

impl From<StatusCode> for i32 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

/// Coarse grouping of codes by numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFamily {
    Success,
    Client,
    Server,
    Infrastructure,
    MapService,
    Unknown,
}

impl StatusFamily {
    pub fn of(code: i32) -> StatusFamily {
        match code {
            200 => StatusFamily::Success,
            400..=499 => StatusFamily::Client,
            500..=509 => StatusFamily::Server,
            510..=529 => StatusFamily::Infrastructure,
            530..=549 => StatusFamily::MapService,
            _ => StatusFamily::Unknown,
        }
    }
}

/// Default message for `code`, or [`UNKNOWN_DEFAULT_MESSAGE`].
pub fn resolve_default_message(code: i32) -> &'static str {
    StatusCode::from_code(code)
        .map(StatusCode::default_message)
        .unwrap_or(UNKNOWN_DEFAULT_MESSAGE)
}

/// Message to show for a failed envelope.
///
/// A server message wins when it is non-empty and differs from the code's
/// default message. Otherwise the table's user message is used, falling back
/// to [`UNKNOWN_USER_MESSAGE`] for codes outside the table.
pub fn resolve_user_message<T>(envelope: &ResponseEnvelope<T>) -> String {
    user_message_for(envelope.code, envelope.message.as_deref())
}

pub(crate) fn user_message_for(code: i32, message: Option<&str>) -> String {
    let known = StatusCode::from_code(code);

    if let Some(message) = message.filter(|m| !m.is_empty()) {
        let default = known.map(StatusCode::default_message);
        if default != Some(message) {
            return message.to_string();
        }
    }

    known
        .map(StatusCode::user_message)
        .unwrap_or(UNKNOWN_USER_MESSAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::HashSet;

    #[test]
    fn test_table_covers_every_documented_code() {
        let codes: HashSet<i32> = StatusCode::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes.len(), 44);

        let mut expected: Vec<i32> = vec![200, 400, 401, 403, 404, 409, 429, 500, 503, 504, 505];
        expected.extend(510..=521);
        expected.extend(530..=549);
        expected.push(599);
        for code in expected {
            assert!(codes.contains(&code), "missing {code}");
        }
    }

    #[test]
    fn test_every_code_has_non_empty_messages() {
        for status in StatusCode::ALL {
            assert!(!status.default_message().is_empty());
            assert!(!status.user_message().is_empty());
            assert_eq!(resolve_default_message(status.code()), status.default_message());

            let bare = ResponseEnvelope::<Value>::new(status.code(), None, None);
            assert_eq!(resolve_user_message(&bare), status.user_message());
        }
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        for code in [0, -1, 201, 302, 418, 522, 550, 600, i32::MAX, i32::MIN] {
            assert_eq!(resolve_default_message(code), UNKNOWN_DEFAULT_MESSAGE);
            let envelope = ResponseEnvelope::<Value>::new(code, None, None);
            assert_eq!(resolve_user_message(&envelope), UNKNOWN_USER_MESSAGE);
        }
    }

    #[test]
    fn test_override_must_differ_from_default() {
        let custom = ResponseEnvelope::<Value>::new(403, Some("custom text".into()), None);
        assert_eq!(resolve_user_message(&custom), "custom text");

        let echoed = ResponseEnvelope::<Value>::new(
            403,
            Some(StatusCode::Forbidden.default_message().into()),
            None,
        );
        assert_eq!(
            resolve_user_message(&echoed),
            StatusCode::Forbidden.user_message()
        );
    }

    #[test]
    fn test_empty_message_is_not_an_override() {
        let envelope = ResponseEnvelope::<Value>::new(404, Some(String::new()), None);
        assert_eq!(
            resolve_user_message(&envelope),
            StatusCode::NotFound.user_message()
        );
    }

    #[test]
    fn test_unknown_code_keeps_server_message() {
        let envelope = ResponseEnvelope::<Value>::new(777, Some("quota reset".into()), None);
        assert_eq!(resolve_user_message(&envelope), "quota reset");
    }

    #[test]
    fn test_families() {
        assert_eq!(StatusCode::Success.family(), StatusFamily::Success);
        assert_eq!(StatusCode::TooManyRequests.family(), StatusFamily::Client);
        assert_eq!(StatusCode::GatewayTimeout.family(), StatusFamily::Server);
        assert_eq!(StatusCode::SystemMaintenance.family(), StatusFamily::Infrastructure);
        assert_eq!(StatusCode::MapTileError.family(), StatusFamily::MapService);
        assert_eq!(StatusCode::UnknownError.family(), StatusFamily::Unknown);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(StatusCode::try_from(429), Ok(StatusCode::TooManyRequests));
        assert_eq!(StatusCode::try_from(430), Err(430));
        assert_eq!(i32::from(StatusCode::MapCrsError), 542);
    }
}
