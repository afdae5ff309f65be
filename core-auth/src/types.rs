use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account role as issued by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    pub fn from_code(code: i32) -> Option<Role> {
        match code {
            0 => Some(Role::Admin),
            1 => Some(Role::User),
            2 => Some(Role::Guest),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Role::Admin => 0,
            Role::User => 1,
            Role::Guest => 2,
        }
    }
}

/// Profile of the signed-in user, persisted as JSON under `userInfo`.
///
/// Unknown fields are kept in `extra` so a profile written by a newer server
/// survives a load/store cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_code: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        self.role_code.and_then(Role::from_code)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// An empty object, which is what a signed-out session stores.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.role_code.is_none()
            && self.extra.is_empty()
    }
}
