#![allow(dead_code)]

use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use screener_api::{
    CancellationSignal, CreateUserResponse, RunStreamEvent, RunResponse, ScreenerApiError,
    ThreadMessage, ThreadResponse,
};
use screener_chat::provider::ChatBackend;

/// Calls observed by the fake backend, in arrival order per operation.
#[derive(Debug, Default)]
pub struct CallLog {
    pub created_users: Vec<String>,
    pub created_threads: Vec<i64>,
    pub thread_lookups: Vec<String>,
    pub posted: Vec<(String, String)>,
    pub run_lookups: Vec<String>,
    pub cancelled_runs: Vec<String>,
    pub streamed_runs: Vec<String>,
}

/// Deterministic fake backend with scripted stream events and switchable
/// failure behavior.
pub struct ScriptedBackend {
    pub log: Mutex<CallLog>,
    script: Vec<RunStreamEvent>,
    run_id: Option<String>,
    thread_exists: bool,
    created_thread_id: String,
    history: Vec<(String, String, String)>,
    existing_user: Option<(i64, Option<String>)>,
    fail_stream_after: Option<(usize, String)>,
    cancel_after: Option<usize>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<RunStreamEvent>) -> Self {
        Self {
            log: Mutex::new(CallLog::default()),
            script,
            run_id: Some("r1".to_string()),
            thread_exists: true,
            created_thread_id: "thread-new".to_string(),
            history: Vec::new(),
            existing_user: None,
            fail_stream_after: None,
            cancel_after: None,
        }
    }

    /// The canonical happy-path script: two tokens, an authoritative
    /// final with one source, then completion.
    pub fn ping_pong() -> Self {
        Self::new(vec![
            RunStreamEvent::Token {
                text: "pon".to_string(),
            },
            RunStreamEvent::Token {
                text: "g".to_string(),
            },
            RunStreamEvent::Final {
                text: "pong".to_string(),
                sources: vec!["cv42".to_string()],
            },
            RunStreamEvent::Done,
        ])
    }

    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    /// `postMessage` answers without a run id.
    pub fn without_run_id(mut self) -> Self {
        self.run_id = None;
        self
    }

    /// `getThread` answers not-found.
    pub fn with_missing_thread(mut self) -> Self {
        self.thread_exists = false;
        self
    }

    pub fn with_created_thread_id(mut self, thread_id: &str) -> Self {
        self.created_thread_id = thread_id.to_string();
        self
    }

    /// Stored history returned by `getThread`, as (id, role, content).
    pub fn with_history(mut self, history: &[(&str, &str, &str)]) -> Self {
        self.history = history
            .iter()
            .map(|(id, role, content)| (id.to_string(), role.to_string(), content.to_string()))
            .collect();
        self
    }

    /// `createUser` answers with the existing-identity conflict.
    pub fn with_existing_user(mut self, user_id: i64, name: Option<&str>) -> Self {
        self.existing_user = Some((user_id, name.map(ToString::to_string)));
        self
    }

    /// The stream fails after emitting `events` events.
    pub fn with_stream_failure_after(mut self, events: usize, message: &str) -> Self {
        self.fail_stream_after = Some((events, message.to_string()));
        self
    }

    /// The cancellation signal trips right before event number `events`,
    /// as if a reset or superseding submission happened mid-stream.
    pub fn with_cancel_after(mut self, events: usize) -> Self {
        self.cancel_after = Some(events);
        self
    }

    fn log(&self) -> std::sync::MutexGuard<'_, CallLog> {
        self.log.lock().expect("call log")
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn create_user(&self, name: &str) -> Result<CreateUserResponse, ScreenerApiError> {
        self.log().created_users.push(name.to_string());
        match &self.existing_user {
            Some((user_id, existing_name)) => Err(ScreenerApiError::UserExists {
                user_id: *user_id,
                name: existing_name.clone(),
            }),
            None => Ok(CreateUserResponse {
                user_id: 1,
                name: Some(name.to_string()),
            }),
        }
    }

    async fn create_thread(&self, user_id: i64) -> Result<String, ScreenerApiError> {
        self.log().created_threads.push(user_id);
        Ok(self.created_thread_id.clone())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadResponse, ScreenerApiError> {
        self.log().thread_lookups.push(thread_id.to_string());
        if !self.thread_exists {
            return Err(ScreenerApiError::NotFound(format!(
                "Thread {thread_id} not found"
            )));
        }

        let raw_messages = self
            .history
            .iter()
            .map(|(id, role, content)| {
                serde_json::json!({"id": id, "role": role, "content": content, "created_at": null})
            })
            .collect::<Vec<_>>();
        let messages: Vec<ThreadMessage> =
            serde_json::from_value(serde_json::Value::Array(raw_messages)).expect("history shape");

        Ok(ThreadResponse {
            thread_id: thread_id.to_string(),
            user_id: 1,
            messages,
        })
    }

    async fn post_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<String, ScreenerApiError> {
        self.log()
            .posted
            .push((thread_id.to_string(), content.to_string()));
        match &self.run_id {
            Some(run_id) => Ok(run_id.clone()),
            None => Err(ScreenerApiError::MissingRunId(
                "postMessage response carried no run_id".to_string(),
            )),
        }
    }

    async fn get_run(&self, run_id: &str) -> Result<RunResponse, ScreenerApiError> {
        self.log().run_lookups.push(run_id.to_string());
        Ok(RunResponse {
            run_id: run_id.to_string(),
            thread_id: "t-1".to_string(),
            status: "error".to_string(),
            created_at: None,
            started_at: None,
            finished_at: None,
            error: Some("scripted failure".to_string()),
        })
    }

    async fn cancel_run(&self, run_id: &str) -> Result<(), ScreenerApiError> {
        self.log().cancelled_runs.push(run_id.to_string());
        Ok(())
    }

    async fn stream_run_events(
        &self,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
        on_event: &mut (dyn FnMut(RunStreamEvent) + Send),
    ) -> Result<(), ScreenerApiError> {
        self.log().streamed_runs.push(run_id.to_string());

        for (index, event) in self.script.iter().enumerate() {
            if let Some((failing_index, message)) = &self.fail_stream_after {
                if index == *failing_index {
                    return Err(ScreenerApiError::Unknown(message.clone()));
                }
            }

            if self.cancel_after == Some(index) {
                if let Some(cancel) = cancellation {
                    cancel.store(true, Ordering::Release);
                }
            }

            if cancellation.is_some_and(|cancel| cancel.load(Ordering::Acquire)) {
                return Err(ScreenerApiError::Cancelled);
            }

            on_event(event.clone());
        }

        Ok(())
    }
}
