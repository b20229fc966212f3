use std::sync::atomic::Ordering;
use std::sync::Arc;

use screener_api::{CancellationSignal, RunStreamEvent};

use crate::provider::ChatBackend;
use crate::transcript::{
    add_assistant_placeholder, add_user_message, append_assistant, finalize_assistant,
    fresh_message_id, set_assistant_error, welcome_transcript, ChatMessage, ChatRole, MessageId,
};

/// User-visible text folded into the placeholder when an exchange fails.
pub const STREAM_FAILED_TEXT: &str = "Streaming failed. Check backend SSE logs.";

/// Controller lifecycle for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    Streaming,
}

/// Outcome of one `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Guardrails rejected the submission; transcript unchanged.
    Rejected,
    Completed,
    /// Voluntary cancellation; partial content kept, no error text.
    Cancelled,
    Failed,
}

#[derive(Debug)]
struct ActiveExchange {
    placeholder_id: MessageId,
    run_id: Option<String>,
    cancel: CancellationSignal,
}

/// Orchestrates one run at a time: submits a message, opens the event feed
/// for the returned run id, folds interpreted events into the transcript in
/// arrival order, and owns the single cancellation handle.
pub struct ChatController {
    phase: Phase,
    transcript: Vec<ChatMessage>,
    active: Option<ActiveExchange>,
    last_error: Option<String>,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            transcript: welcome_transcript(),
            active: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Technical detail of the most recent failure, for observability. The
    /// transcript itself only ever shows [`STREAM_FAILED_TEXT`].
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the transcript with the welcome message followed by stored
    /// thread history.
    pub fn hydrate(&mut self, history: Vec<ChatMessage>) {
        let mut transcript = welcome_transcript();
        transcript.extend(history);
        self.transcript = transcript;
    }

    /// Append a system notice without touching control state.
    pub fn push_system(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage::new(
            fresh_message_id(),
            ChatRole::System,
            content,
        ));
    }

    /// Signal the live cancellation handle, if any. Idempotent; the
    /// in-flight read loop observes the signal at its next suspension
    /// point and winds down through the voluntary-cancellation path.
    pub fn cancel_active(&self) {
        if let Some(active) = self.active.as_ref() {
            active.cancel.store(true, Ordering::Release);
        }
    }

    /// Clear the transcript back to the fixed welcome message, terminating
    /// any in-flight exchange first.
    pub fn reset_transcript(&mut self) {
        self.cancel_active();
        self.active = None;
        self.phase = Phase::Idle;
        self.last_error = None;
        self.transcript = welcome_transcript();
    }

    /// Guarded entry into an exchange.
    ///
    /// Rejected (returns `None`, transcript untouched) when the text is
    /// blank, no thread identity exists, or an exchange is already in
    /// flight. On acceptance the user message and assistant placeholder are
    /// appended synchronously, before any network round trip.
    pub fn begin_submit(
        &mut self,
        thread_id: Option<&str>,
        text: &str,
    ) -> Option<(String, MessageId)> {
        let text = text.trim();
        if text.is_empty() || self.phase != Phase::Idle {
            return None;
        }
        let thread_id = thread_id?.to_string();

        // Terminate any stale handle before arming a new one.
        self.cancel_active();

        let placeholder_id = fresh_message_id();
        self.transcript = add_user_message(&self.transcript, text);
        self.transcript = add_assistant_placeholder(&self.transcript, &placeholder_id);
        self.active = Some(ActiveExchange {
            placeholder_id: placeholder_id.clone(),
            run_id: None,
            cancel: CancellationSignal::default(),
        });
        self.phase = Phase::Sending;

        Some((thread_id, placeholder_id))
    }

    /// The backend accepted the message and returned a run id; the event
    /// feed opens next.
    pub fn on_run_started(&mut self, run_id: &str) {
        if let Some(active) = self.active.as_mut() {
            active.run_id = Some(run_id.to_string());
            self.phase = Phase::Streaming;
        }
    }

    /// Fold one interpreted event into the transcript.
    ///
    /// Events arriving after the exchange ended (stale callbacks) are
    /// dropped. Tool events are observability only and never touch
    /// transcript content.
    pub fn apply_stream_event(&mut self, event: &RunStreamEvent) {
        let Some(active) = self.active.as_ref() else {
            tracing::debug!("dropping stream event without an active exchange");
            return;
        };
        let placeholder_id = active.placeholder_id.clone();

        match event {
            RunStreamEvent::Token { text } => {
                self.transcript = append_assistant(&self.transcript, &placeholder_id, text);
            }
            RunStreamEvent::Final { text, sources } => {
                self.transcript =
                    finalize_assistant(&self.transcript, &placeholder_id, text, sources);
            }
            RunStreamEvent::Done => {
                tracing::debug!(run_id = ?active.run_id, "run reported done");
            }
            RunStreamEvent::ToolStart { tool, input } => {
                tracing::debug!(tool = tool.as_deref(), ?input, "tool started");
            }
            RunStreamEvent::ToolEnd { tool, output } => {
                tracing::debug!(tool = tool.as_deref(), ?output, "tool finished");
            }
        }
    }

    /// The feed closed cleanly (a `done` event or plain end of stream).
    pub fn on_stream_complete(&mut self) {
        self.active = None;
        self.phase = Phase::Idle;
    }

    /// Voluntary cancellation: keep whatever content accumulated, show no
    /// error text.
    pub fn on_stream_cancelled(&mut self) {
        self.active = None;
        self.phase = Phase::Idle;
    }

    /// Genuine submission or stream failure: the open placeholder must not
    /// be left perpetually empty, so it is finalized with error text.
    pub fn on_exchange_failed(&mut self, detail: impl Into<String>) {
        if let Some(active) = self.active.take() {
            self.transcript = set_assistant_error(
                &self.transcript,
                &active.placeholder_id,
                STREAM_FAILED_TEXT,
            );
        }
        self.phase = Phase::Idle;
        self.last_error = Some(detail.into());
    }

    /// Run one full exchange: post the message, stream the run's events,
    /// and settle back to idle. Interpreted events are also forwarded to
    /// `observer` for presentation, in the same order they are folded.
    pub async fn submit(
        &mut self,
        backend: &dyn ChatBackend,
        thread_id: Option<&str>,
        text: &str,
        observer: &mut (dyn FnMut(&RunStreamEvent) + Send),
    ) -> SubmitOutcome {
        let Some((thread_id, _placeholder_id)) = self.begin_submit(thread_id, text) else {
            return SubmitOutcome::Rejected;
        };

        let run_id = match backend.post_message(&thread_id, text.trim()).await {
            Ok(run_id) => run_id,
            Err(error) if error.is_cancelled() => {
                self.on_stream_cancelled();
                return SubmitOutcome::Cancelled;
            }
            Err(error) => {
                tracing::warn!(%error, "message submission failed");
                self.on_exchange_failed(error.to_string());
                return SubmitOutcome::Failed;
            }
        };

        self.on_run_started(&run_id);
        let cancel = match self.active.as_ref() {
            Some(active) => Arc::clone(&active.cancel),
            None => return SubmitOutcome::Rejected,
        };

        let result = backend
            .stream_run_events(&run_id, Some(&cancel), &mut |event| {
                self.apply_stream_event(&event);
                observer(&event);
            })
            .await;

        match result {
            Ok(()) => {
                self.on_stream_complete();
                SubmitOutcome::Completed
            }
            Err(error) if error.is_cancelled() => {
                if let Err(cancel_error) = backend.cancel_run(&run_id).await {
                    tracing::debug!(%cancel_error, %run_id, "server-side cancel failed");
                }
                self.on_stream_cancelled();
                SubmitOutcome::Cancelled
            }
            Err(error) => {
                tracing::warn!(%error, %run_id, "event stream failed");
                match backend.get_run(&run_id).await {
                    Ok(run) => tracing::warn!(
                        status = %run.status,
                        run_error = ?run.error,
                        "run snapshot after stream failure"
                    ),
                    Err(snapshot_error) => {
                        tracing::debug!(%snapshot_error, "run snapshot unavailable");
                    }
                }
                self.on_exchange_failed(error.to_string());
                SubmitOutcome::Failed
            }
        }
    }
}
