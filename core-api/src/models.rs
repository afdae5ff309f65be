//! Domain models exchanged with the server.
//!
//! Field names follow the server's camelCase JSON. Timestamps are kept as the
//! strings the server sends because endpoints disagree on the format.

use core_auth::UserProfile;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Users
// =============================================================================

/// Account as listed by the admin endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    /// Only sent on create; the server never returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<String>,
    /// 0 = disabled, 1 = enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

/// Payload of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_code: Option<i32>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl LoginData {
    /// Profile to persist alongside the token.
    pub fn profile(&self) -> UserProfile {
        let mut extra = Map::new();
        if let Some(expires_in) = self.expires_in {
            extra.insert("expiresIn".to_string(), Value::from(expires_in));
        }
        UserProfile {
            id: self.id,
            username: Some(self.username.clone()),
            email: self.email.clone(),
            role_code: self.role_code,
            extra,
        }
    }
}

/// Body of `PATCH /user/updatePwd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub old_pwd: String,
    pub new_pwd: String,
    pub re_pwd: String,
}

impl PasswordUpdate {
    pub fn new(old_pwd: impl Into<String>, new_pwd: impl Into<String>) -> Self {
        let new_pwd = new_pwd.into();
        Self {
            old_pwd: old_pwd.into(),
            re_pwd: new_pwd.clone(),
            new_pwd,
        }
    }
}

/// Daily download quota of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    /// Remaining downloads; `None` when no quota has been set.
    pub value: Option<i64>,
    /// Seconds until the quota resets; negative when the key has no expiry.
    pub ttl_seconds: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUpdate {
    pub value: u32,
    pub ttl_hours: u32,
}

// =============================================================================
// Paging
// =============================================================================

/// One page of a server-side listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBean<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new", alias = "list", alias = "rows")]
    pub items: Vec<T>,
}

impl<T> Default for PageBean<T> {
    fn default() -> Self {
        Self {
            total: 0,
            items: Vec::new(),
        }
    }
}

/// 1-based page selector used by every paged endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_num: u32,
    pub page_size: u32,
}

impl PageQuery {
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num: page_num.max(1),
            page_size,
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: 10,
        }
    }
}

// =============================================================================
// Cement plants
// =============================================================================

/// Operating status of a plant. The server stores whatever uploads carry,
/// so values outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantStatus {
    Active,
    Inactive,
    UnderConstruction,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CementPlant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_id: Option<i64>,
    pub plant_name: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// A detection of a plant in satellite imagery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CementPlantIdentification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_id: Option<i64>,
    pub plant_id: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub identification_time: String,
    /// Imagery source such as `GF-2`, `Landsat-8` or `Sentinel-2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndvi_index: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_name: Option<String>,
}

// =============================================================================
// Files
// =============================================================================

/// Raster file registered with the geospatial service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeospatialFile {
    pub file_id: i64,
    pub file_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub coordinate_system: Option<String>,
    #[serde(default)]
    pub bounds_west: Option<f64>,
    #[serde(default)]
    pub bounds_east: Option<f64>,
    #[serde(default)]
    pub bounds_south: Option<f64>,
    #[serde(default)]
    pub bounds_north: Option<f64>,
    #[serde(default)]
    pub resolution_x: Option<f64>,
    #[serde(default)]
    pub resolution_y: Option<f64>,
    #[serde(default)]
    pub bands_count: Option<u32>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub upload_user_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Entry of the shared upload directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    #[serde(default)]
    pub path: Option<String>,
}

// =============================================================================
// Pollution
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollutionData {
    pub id: i64,
    /// One of `NO2`, `PM25`, `PM10`, `O3`.
    #[serde(default)]
    pub pollutant_type: Option<String>,
    #[serde(default)]
    pub data_format: Option<i32>,
    #[serde(default)]
    pub produce_time: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub avg_concentration: Option<f64>,
    #[serde(default)]
    pub max_concentration: Option<f64>,
    #[serde(default)]
    pub warning_location: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Filters for `GET /pollution`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollutionQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollutant_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
}

// =============================================================================
// Background tasks
// =============================================================================

/// Lifecycle of a queued download task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Processing,
    Done,
    Error,
    #[serde(untagged)]
    Other(String),
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Done | TaskState::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Processing => "processing",
            TaskState::Done => "done",
            TaskState::Error => "error",
            TaskState::Other(state) => state,
        }
    }
}

/// Status record of a background task. Extra fields are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
