use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;
use serde_json::Value;

#[derive(Debug)]
pub enum ScreenerApiError {
    InvalidBaseUrl(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    /// Thread or run lookup failed because the resource no longer exists.
    NotFound(String),
    /// The backend rejected `createUser` because the name is taken, and
    /// embedded the existing identity in the error detail.
    UserExists {
        user_id: i64,
        name: Option<String>,
    },
    /// `postMessage` answered without a usable run id.
    MissingRunId(String),
    Serde(JsonError),
    Cancelled,
    Unknown(String),
}

impl ScreenerApiError {
    /// True when the error is the voluntary-cancellation signal rather than
    /// a genuine failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// FastAPI-style error envelope: `{"detail": <string | object>}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<Value>,
}

impl fmt::Display for ScreenerApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::UserExists { user_id, name } => match name {
                Some(name) if !name.trim().is_empty() => {
                    write!(f, "user '{name}' already exists (id {user_id})")
                }
                _ => write!(f, "user already exists (id {user_id})"),
            },
            Self::MissingRunId(message) => write!(f, "missing run id: {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ScreenerApiError {}

impl From<reqwest::Error> for ScreenerApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ScreenerApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Flatten an error response body into a readable message.
///
/// Accepts a string detail, an object detail with a `message` field, any
/// other JSON detail (rendered verbatim), or a non-JSON body.
pub fn parse_error_detail(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return fallback();
    };

    match parsed.detail {
        Some(Value::String(message)) if !message.trim().is_empty() => message,
        Some(Value::Object(fields)) => match fields.get("message").and_then(Value::as_str) {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => Value::Object(fields).to_string(),
        },
        Some(other) if !other.is_null() => other.to_string(),
        _ => fallback(),
    }
}

/// Extract the existing identity from a create-user conflict body.
///
/// The backend reports the conflict with a JSON detail of the shape
/// `{"message": ..., "user_id": <number>, "name": <string | null>}`. Only a
/// numeric `user_id` counts; anything else is not a conflict payload.
pub fn existing_user_in_detail(body: &str) -> Option<(i64, Option<String>)> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    let detail = parsed.detail?;
    let user_id = detail.get("user_id")?.as_i64()?;
    let name = detail
        .get("name")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    Some((user_id, name))
}

/// Map a non-success response into the error taxonomy.
///
/// The create-user conflict arrives as HTTP 401 with the existing identity
/// embedded in the detail; that status is otherwise left as a plain status
/// error, no broader auth semantics are inferred from it.
pub fn classify_status_error(status: StatusCode, body: &str) -> ScreenerApiError {
    if status == StatusCode::NOT_FOUND {
        return ScreenerApiError::NotFound(parse_error_detail(status, body));
    }

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::CONFLICT) {
        if let Some((user_id, name)) = existing_user_in_detail(body) {
            return ScreenerApiError::UserExists { user_id, name };
        }
    }

    ScreenerApiError::Status(status, parse_error_detail(status, body))
}
