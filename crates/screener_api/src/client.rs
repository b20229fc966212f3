use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ScreenerApiConfig;
use crate::error::{classify_status_error, ScreenerApiError};
use crate::events::{interpret_frame, RunStreamEvent};
use crate::payload::{
    CancelRunResponse, CreateThreadBody, CreateThreadResponse, CreateUserBody, CreateUserResponse,
    PostMessageBody, PostMessageResponse, RunResponse, ThreadResponse,
};
use crate::sse::SseFrameParser;
use crate::url;

/// Shared cancellation signal checked at every suspension point of the
/// event feed read loop.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// HTTP client for the screener backend endpoints.
#[derive(Debug)]
pub struct ScreenerApiClient {
    http: Client,
    config: ScreenerApiConfig,
}

impl ScreenerApiClient {
    pub fn new(config: ScreenerApiConfig) -> Result<Self, ScreenerApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ScreenerApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ScreenerApiConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn build_headers(&self) -> Result<HeaderMap, ScreenerApiError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.config.extra_headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    ScreenerApiError::InvalidBaseUrl(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(value).map_err(|_| {
                    ScreenerApiError::InvalidBaseUrl(format!("invalid header value for {key}"))
                })?,
            );
        }
        if let Some(user_agent) = self.config.user_agent.as_deref() {
            headers.insert(
                reqwest::header::USER_AGENT,
                HeaderValue::from_str(user_agent).map_err(|_| {
                    ScreenerApiError::InvalidBaseUrl("invalid user agent value".to_string())
                })?,
            );
        }
        Ok(headers)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ScreenerApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status_error(status, &body));
        }

        let body = response.text().await.map_err(ScreenerApiError::from)?;
        serde_json::from_str(&body).map_err(ScreenerApiError::from)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ScreenerApiError> {
        let response = self
            .http
            .get(url)
            .headers(self.build_headers()?)
            .send()
            .await
            .map_err(ScreenerApiError::from)?;
        Self::read_json(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: String,
        body: &B,
    ) -> Result<T, ScreenerApiError> {
        let response = self
            .http
            .post(url)
            .headers(self.build_headers()?)
            .json(body)
            .send()
            .await
            .map_err(ScreenerApiError::from)?;
        Self::read_json(response).await
    }

    /// `POST /users`. A conflict surfaces as
    /// [`ScreenerApiError::UserExists`] carrying the existing identity.
    pub async fn create_user(&self, name: &str) -> Result<CreateUserResponse, ScreenerApiError> {
        let body = CreateUserBody {
            name: name.to_string(),
        };
        self.post_json(url::users_url(self.base_url())?, &body).await
    }

    /// `POST /threads`.
    pub async fn create_thread(&self, user_id: i64) -> Result<String, ScreenerApiError> {
        let body = CreateThreadBody { user_id };
        let response: CreateThreadResponse = self
            .post_json(url::threads_url(self.base_url())?, &body)
            .await?;
        Ok(response.thread_id)
    }

    /// `GET /threads/{id}`. A missing thread surfaces as
    /// [`ScreenerApiError::NotFound`].
    pub async fn get_thread(&self, thread_id: &str) -> Result<ThreadResponse, ScreenerApiError> {
        self.get_json(url::thread_url(self.base_url(), thread_id)?)
            .await
    }

    /// `POST /threads/{id}/messages`; returns the created run id.
    ///
    /// An absent or non-string `run_id` in an otherwise successful response
    /// is a hard error, never silently ignored.
    pub async fn post_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<String, ScreenerApiError> {
        let body = PostMessageBody {
            content: content.to_string(),
        };
        let response: PostMessageResponse = self
            .post_json(url::thread_messages_url(self.base_url(), thread_id)?, &body)
            .await?;

        match response.run_id() {
            Some(run_id) => Ok(run_id.to_string()),
            None => Err(ScreenerApiError::MissingRunId(format!(
                "postMessage response for thread {thread_id} carried {:?}",
                response.run_id
            ))),
        }
    }

    /// `GET /runs/{id}`, the polling fallback view of a run.
    pub async fn get_run(&self, run_id: &str) -> Result<RunResponse, ScreenerApiError> {
        self.get_json(url::run_url(self.base_url(), run_id)?).await
    }

    /// `POST /runs/{id}/cancel`, best-effort server-side cancellation.
    pub async fn cancel_run(&self, run_id: &str) -> Result<(), ScreenerApiError> {
        let _: CancelRunResponse = self
            .post_json(
                url::run_cancel_url(self.base_url(), run_id)?,
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    /// Open the event feed for a run and forward interpreted events in
    /// arrival order until the stream closes.
    ///
    /// A non-success connection status fails immediately; the decoder never
    /// serves truncated content as if it were complete. The cancellation
    /// signal is checked at every suspension point, and observing it yields
    /// [`ScreenerApiError::Cancelled`] so callers can distinguish voluntary
    /// cancellation from a genuine stream failure.
    pub async fn stream_run_events<F>(
        &self,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<(), ScreenerApiError>
    where
        F: FnMut(RunStreamEvent),
    {
        let request = self
            .http
            .get(url::run_events_url(self.base_url(), run_id)?)
            .headers(self.build_headers()?)
            .header(ACCEPT, "text/event-stream");

        let response = await_or_cancel(request.send(), cancellation)
            .await?
            .map_err(ScreenerApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            return Err(classify_status_error(status, &body));
        }

        let mut bytes = response.bytes_stream();
        let mut parser = SseFrameParser::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(ScreenerApiError::Cancelled);
            }
            let chunk = chunk.map_err(ScreenerApiError::from)?;
            for frame in parser.feed(&chunk) {
                match interpret_frame(&frame) {
                    Some(event) => on_event(event),
                    None if frame.event.is_empty() => {}
                    None => {
                        tracing::debug!(event = %frame.event, "ignoring unrecognized feed event");
                    }
                }
            }
        }

        if is_cancelled(cancellation) {
            return Err(ScreenerApiError::Cancelled);
        }

        if !parser.is_empty_buffer() {
            tracing::debug!(run_id, "discarding partial frame at end of stream");
        }

        Ok(())
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

/// Await a future while polling the cancellation signal.
///
/// Cancellation must stop the read loop promptly even while a chunk await
/// is pending, so the wait is chopped into short poll intervals.
async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ScreenerApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ScreenerApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ScreenerApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::{await_or_cancel, ScreenerApiError};

    #[tokio::test]
    async fn await_or_cancel_returns_output_without_signal() {
        let output = await_or_cancel(async { 41 + 1 }, None).await;
        assert!(matches!(output, Ok(42)));
    }

    #[tokio::test]
    async fn await_or_cancel_reports_cancellation() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result = await_or_cancel(std::future::pending::<()>(), Some(&cancel)).await;
        assert!(matches!(result, Err(ScreenerApiError::Cancelled)));
        assert!(cancel.load(Ordering::Acquire));
    }
}
