use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============= Entity Types =============

/// Server-side user record as returned by `/auth/me` and the login envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A schedule entry. The backend is inconsistent about field casing, so both
/// `start_time` and `startTime` (and the end counterparts) are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(alias = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Task lifecycle states. Records without a status are treated as active
/// by the store views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Pending,
    Completed,
    Archived,
}

/// Task priority, ordered high before medium before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Sort rank: lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            TaskPriority::High => 0,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "completedAt")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_signed: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

// ============= Request Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a delivered response: connection refused,
    /// DNS failure, or the request deadline elapsed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A delivered response with a failure status. Statuses in [400, 500)
    /// reach this variant only when a caller unwraps the delivered response;
    /// statuses >= 500 are raised by the adapter itself.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body did not match any expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// HTTP status of the failure, when one was delivered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ApiError::Transport(format!("connection failed: {err}"))
        } else if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
