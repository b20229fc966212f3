use ::url::Url;

use crate::error::ScreenerApiError;

/// Default base URL for screener backend requests.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Normalize a configured base URL.
///
/// Normalization rules:
/// 1) empty/blank input falls back to [`DEFAULT_BASE_URL`]
/// 2) surrounding whitespace is removed
/// 3) trailing slashes are removed so segment joins stay predictable
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}

/// Build an endpoint URL from the base plus percent-encoded path segments.
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<String, ScreenerApiError> {
    let normalized = normalize_base_url(base);
    let mut url = Url::parse(&normalized)
        .map_err(|error| ScreenerApiError::InvalidBaseUrl(format!("{normalized}: {error}")))?;

    url.path_segments_mut()
        .map_err(|()| ScreenerApiError::InvalidBaseUrl(format!("{normalized}: cannot-be-a-base")))?
        .extend(segments);

    Ok(url.to_string())
}

pub fn users_url(base: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["users"])
}

pub fn threads_url(base: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["threads"])
}

pub fn thread_url(base: &str, thread_id: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["threads", thread_id])
}

pub fn thread_messages_url(base: &str, thread_id: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["threads", thread_id, "messages"])
}

pub fn run_url(base: &str, run_id: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["runs", run_id])
}

pub fn run_cancel_url(base: &str, run_id: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["runs", run_id, "cancel"])
}

pub fn run_events_url(base: &str, run_id: &str) -> Result<String, ScreenerApiError> {
    endpoint_url(base, &["runs", run_id, "events"])
}
