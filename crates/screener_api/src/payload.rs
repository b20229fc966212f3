use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Request body for `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserBody {
    pub name: String,
}

/// Response for `POST /users`.
///
/// The backend user id is numeric on the wire; callers that persist it keep
/// the decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user_id: i64,
    pub name: Option<String>,
}

/// Request body for `POST /threads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateThreadBody {
    pub user_id: i64,
}

/// Response for `POST /threads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateThreadResponse {
    pub thread_id: String,
}

/// Request body for `POST /threads/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageBody {
    pub content: String,
}

/// Raw response for `POST /threads/{id}/messages`.
///
/// `run_id` stays untyped here: an absent or non-string value must surface
/// as [`crate::ScreenerApiError::MissingRunId`], not as a decode failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostMessageResponse {
    #[serde(default)]
    pub run_id: Option<Value>,
}

impl PostMessageResponse {
    /// Returns the run id when it is a non-empty string.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.run_id
            .as_ref()
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// One stored message inside a thread history response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Response for `GET /threads/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub user_id: i64,
    #[serde(default)]
    pub messages: Vec<ThreadMessage>,
}

/// Canonical client-side view of a backend run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Parse a wire status string. The backend emits `done`, `error` and
    /// `canceled` for the terminal states.
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "queued" => Self::Queued,
            "running" => Self::Running,
            "done" => Self::Completed,
            "error" => Self::Failed,
            "canceled" => Self::Cancelled,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "done",
            Self::Failed => "error",
            Self::Cancelled => "canceled",
        }
    }

    /// True when the run can no longer make progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Response for `GET /runs/{id}`, the polling fallback view of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunResponse {
    pub run_id: String,
    pub thread_id: String,
    /// Raw wire status; unknown strings are preserved but unclassified.
    pub status: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RunResponse {
    #[must_use]
    pub fn status(&self) -> Option<RunStatus> {
        RunStatus::parse(&self.status)
    }
}

/// Response for `POST /runs/{id}/cancel`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CancelRunResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub status: Option<String>,
}
