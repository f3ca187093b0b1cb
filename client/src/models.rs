use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub success: bool,
}

/// A registered person tracked by the attendance system. The `id` is
/// immutable; every other field can change via an update. Uniqueness of the
/// admission number is enforced server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub admission_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub roll_number: String,
    pub class_name: String,
    pub section: String,
    pub batch: String,
    pub created_at: DateTime<Utc>,
}

/// Partial user payload for create and update calls. `None` fields are
/// omitted from the request body entirely.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

/// A hardware scanner. `device_id` is a human-chosen unique slug; `token` is
/// the secret its firmware uses to authenticate attendance submissions, and
/// rotating it invalidates the previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub device_id: String,
    pub name: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<DeviceCount>,
}

/// Relation summary the API attaches to a device listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCount {
    pub attendance: u64,
}

/// Registration payload for a new device. The server generates the secret
/// token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub device_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceEvent {
    In,
    Out,
}

impl std::fmt::Display for AttendanceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceEvent::In => write!(f, "IN"),
            AttendanceEvent::Out => write!(f, "OUT"),
        }
    }
}

/// An attendance event recorded by a device. Read-only from this layer:
/// never created, edited, or deleted here. `confidence` is the biometric
/// match percentage and may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub event: AttendanceEvent,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub user: User,
    pub device: Device,
}

/// Server-computed window descriptor accompanying every paginated list
/// response; `pages == ceil(total / limit)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceListResponse {
    pub attendances: Vec<Attendance>,
    pub pagination: Pagination,
}
