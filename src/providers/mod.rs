use std::sync::Arc;

use screener_api::{ScreenerApiClient, ScreenerApiConfig};

use crate::provider::ChatBackend;

pub mod mock;

pub use mock::MockBackend;

pub const BACKEND_ENV_VAR: &str = "SCREENER_BACKEND";
pub const BASE_URL_ENV_VAR: &str = "SCREENER_BASE_URL";

/// Select a backend from the environment.
///
/// `SCREENER_BACKEND=mock` yields the deterministic in-process backend;
/// `SCREENER_BACKEND=http` (the default when unset) yields the real
/// transport against `SCREENER_BASE_URL` or the built-in default base.
pub fn backend_from_env() -> Result<Arc<dyn ChatBackend>, String> {
    let selection = std::env::var(BACKEND_ENV_VAR).unwrap_or_else(|_| "http".to_string());

    match selection.trim() {
        "mock" => Ok(Arc::new(MockBackend::default())),
        "http" | "" => {
            let base_url = std::env::var(BASE_URL_ENV_VAR).unwrap_or_default();
            let config = ScreenerApiConfig::default().with_base_url(base_url);
            let client = ScreenerApiClient::new(config)
                .map_err(|error| format!("failed to build screener client: {error}"))?;
            Ok(Arc::new(client))
        }
        other => Err(format!(
            "unsupported {BACKEND_ENV_VAR} value: {other} (expected 'mock' or 'http')"
        )),
    }
}
