use async_trait::async_trait;

use screener_api::{
    CancellationSignal, CreateUserResponse, RunResponse, RunStreamEvent, ScreenerApiClient,
    ScreenerApiError, ThreadResponse,
};

/// Backend seam consumed by the session manager and run controller.
///
/// Mirrors the screener HTTP surface one to one so the engine can be driven
/// against the real transport or a deterministic in-process backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn create_user(&self, name: &str) -> Result<CreateUserResponse, ScreenerApiError>;

    async fn create_thread(&self, user_id: i64) -> Result<String, ScreenerApiError>;

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadResponse, ScreenerApiError>;

    async fn post_message(&self, thread_id: &str, content: &str)
        -> Result<String, ScreenerApiError>;

    async fn get_run(&self, run_id: &str) -> Result<RunResponse, ScreenerApiError>;

    async fn cancel_run(&self, run_id: &str) -> Result<(), ScreenerApiError>;

    /// Stream interpreted run events in arrival order until the feed
    /// closes. Observing the cancellation signal yields
    /// [`ScreenerApiError::Cancelled`], never the failure path.
    async fn stream_run_events(
        &self,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
        on_event: &mut (dyn FnMut(RunStreamEvent) + Send),
    ) -> Result<(), ScreenerApiError>;
}

#[async_trait]
impl ChatBackend for ScreenerApiClient {
    async fn create_user(&self, name: &str) -> Result<CreateUserResponse, ScreenerApiError> {
        ScreenerApiClient::create_user(self, name).await
    }

    async fn create_thread(&self, user_id: i64) -> Result<String, ScreenerApiError> {
        ScreenerApiClient::create_thread(self, user_id).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadResponse, ScreenerApiError> {
        ScreenerApiClient::get_thread(self, thread_id).await
    }

    async fn post_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<String, ScreenerApiError> {
        ScreenerApiClient::post_message(self, thread_id, content).await
    }

    async fn get_run(&self, run_id: &str) -> Result<RunResponse, ScreenerApiError> {
        ScreenerApiClient::get_run(self, run_id).await
    }

    async fn cancel_run(&self, run_id: &str) -> Result<(), ScreenerApiError> {
        ScreenerApiClient::cancel_run(self, run_id).await
    }

    async fn stream_run_events(
        &self,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
        on_event: &mut (dyn FnMut(RunStreamEvent) + Send),
    ) -> Result<(), ScreenerApiError> {
        ScreenerApiClient::stream_run_events(self, run_id, cancellation, |event| on_event(event))
            .await
    }
}
