use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use screener_api::{
    CancellationSignal, CreateUserResponse, RunResponse, RunStreamEvent, ScreenerApiError,
    ThreadResponse,
};
use serde_json::json;

use crate::provider::ChatBackend;

const TOKEN_DELAY: Duration = Duration::from_millis(40);

#[derive(Debug, Default)]
struct MockState {
    users: HashMap<String, i64>,
    threads: HashMap<String, i64>,
    runs: HashMap<String, String>,
    next_user: i64,
    next_thread: u64,
    next_run: u64,
}

/// Deterministic in-process backend for local runs without a server.
///
/// Identity behavior mirrors the real backend: re-registering a name
/// answers with the existing-identity conflict, and unknown thread/run ids
/// answer not-found.
pub struct MockBackend {
    state: Mutex<MockState>,
    script: Vec<RunStreamEvent>,
}

impl Default for MockBackend {
    fn default() -> Self {
        let chunks = [
            "Here's what I found in the CV pool.\n",
            "- cv42 lists four years of Python, ",
            "including two shipping data pipelines.\n",
            "- cv7 mentions Python for scripting only.\n",
            "Ask about a specific candidate for details.",
        ];

        let mut script = vec![
            RunStreamEvent::ToolStart {
                tool: Some("rag.search".to_string()),
                input: Some(json!({"top_k": 5})),
            },
            RunStreamEvent::ToolEnd {
                tool: Some("rag.search".to_string()),
                output: Some(json!({"sources": ["cv42", "cv7"], "chunks": 5})),
            },
        ];
        script.extend(chunks.iter().map(|chunk| RunStreamEvent::Token {
            text: (*chunk).to_string(),
        }));
        script.push(RunStreamEvent::Final {
            text: chunks.concat(),
            sources: vec!["cv42".to_string(), "cv7".to_string()],
        });
        script.push(RunStreamEvent::Done);

        Self::with_script(script)
    }
}

impl MockBackend {
    #[must_use]
    pub fn with_script(script: Vec<RunStreamEvent>) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            script,
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn create_user(&self, name: &str) -> Result<CreateUserResponse, ScreenerApiError> {
        let mut state = self.state.lock().expect("mock state");
        if let Some(user_id) = state.users.get(name) {
            return Err(ScreenerApiError::UserExists {
                user_id: *user_id,
                name: Some(name.to_string()),
            });
        }

        state.next_user += 1;
        let user_id = state.next_user;
        state.users.insert(name.to_string(), user_id);
        Ok(CreateUserResponse {
            user_id,
            name: Some(name.to_string()),
        })
    }

    async fn create_thread(&self, user_id: i64) -> Result<String, ScreenerApiError> {
        let mut state = self.state.lock().expect("mock state");
        state.next_thread += 1;
        let thread_id = format!("thread-{}", state.next_thread);
        state.threads.insert(thread_id.clone(), user_id);
        Ok(thread_id)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadResponse, ScreenerApiError> {
        let state = self.state.lock().expect("mock state");
        match state.threads.get(thread_id) {
            Some(user_id) => Ok(ThreadResponse {
                thread_id: thread_id.to_string(),
                user_id: *user_id,
                messages: Vec::new(),
            }),
            None => Err(ScreenerApiError::NotFound(format!(
                "Thread {thread_id} not found"
            ))),
        }
    }

    async fn post_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<String, ScreenerApiError> {
        let mut state = self.state.lock().expect("mock state");
        if !state.threads.contains_key(thread_id) {
            return Err(ScreenerApiError::NotFound(format!(
                "Thread {thread_id} not found"
            )));
        }

        state.next_run += 1;
        let run_id = format!("run-{}", state.next_run);
        state.runs.insert(run_id.clone(), content.to_string());
        Ok(run_id)
    }

    async fn get_run(&self, run_id: &str) -> Result<RunResponse, ScreenerApiError> {
        let state = self.state.lock().expect("mock state");
        if !state.runs.contains_key(run_id) {
            return Err(ScreenerApiError::NotFound(format!(
                "Run {run_id} not found"
            )));
        }

        Ok(RunResponse {
            run_id: run_id.to_string(),
            thread_id: "thread-1".to_string(),
            status: "done".to_string(),
            created_at: None,
            started_at: None,
            finished_at: None,
            error: None,
        })
    }

    async fn cancel_run(&self, _run_id: &str) -> Result<(), ScreenerApiError> {
        Ok(())
    }

    async fn stream_run_events(
        &self,
        run_id: &str,
        cancellation: Option<&CancellationSignal>,
        on_event: &mut (dyn FnMut(RunStreamEvent) + Send),
    ) -> Result<(), ScreenerApiError> {
        {
            let state = self.state.lock().expect("mock state");
            if !state.runs.contains_key(run_id) {
                return Err(ScreenerApiError::NotFound(format!(
                    "Run {run_id} not found"
                )));
            }
        }

        for event in &self.script {
            if cancellation.is_some_and(|cancel| cancel.load(Ordering::Acquire)) {
                return Err(ScreenerApiError::Cancelled);
            }

            if matches!(event, RunStreamEvent::Token { .. }) {
                tokio::time::sleep(TOKEN_DELAY).await;
            }
            on_event(event.clone());
        }

        Ok(())
    }
}
