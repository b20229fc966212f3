use std::sync::Arc;

use screener_api::RunStreamEvent;
use session_store::SessionRecord;

use crate::commands::SlashCommand;
use crate::controller::{ChatController, SubmitOutcome};
use crate::provider::ChatBackend;
use crate::session::{SessionError, SessionManager};
use crate::transcript::ChatMessage;

pub const HELP_TEXT: &str = "Commands: /help, /reset, /quit";

/// What the front should do after a slash command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    /// The session was cleared; the caller must run sign-in again.
    SignedOut,
    Quit,
}

/// Application state: the active session identity plus the conversation
/// engine, glued to one backend.
pub struct ChatApp {
    backend: Arc<dyn ChatBackend>,
    manager: SessionManager,
    controller: ChatController,
    session: Option<SessionRecord>,
}

impl ChatApp {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, manager: SessionManager) -> Self {
        Self {
            backend,
            manager,
            controller: ChatController::new(),
            session: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&SessionRecord> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.controller.messages()
    }

    #[must_use]
    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Resolve a persisted identity and hydrate the transcript from the
    /// adopted thread's stored history. Returns whether a session exists.
    pub async fn startup(&mut self) -> Result<bool, SessionError> {
        match self.manager.resolve(self.backend.as_ref()).await? {
            Some(resolved) => {
                self.controller.hydrate(resolved.history);
                self.session = Some(resolved.record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Establish a fresh identity for `name` and adopt it.
    pub async fn sign_in(&mut self, name: &str) -> Result<(), SessionError> {
        let record = self.manager.establish(self.backend.as_ref(), name).await?;
        tracing::info!(user_id = %record.user_id, thread_id = %record.thread_id, "session established");
        self.session = Some(record);
        Ok(())
    }

    /// Submit one chat line through the run controller.
    pub async fn submit_line(
        &mut self,
        text: &str,
        observer: &mut (dyn FnMut(&RunStreamEvent) + Send),
    ) -> SubmitOutcome {
        let thread_id = self.session.as_ref().map(|record| record.thread_id.clone());
        self.controller
            .submit(
                self.backend.as_ref(),
                thread_id.as_deref(),
                text,
                observer,
            )
            .await
    }

    /// Apply a slash command.
    pub fn handle_command(&mut self, command: SlashCommand) -> Result<CommandOutcome, SessionError> {
        match command {
            SlashCommand::Help => {
                self.controller.push_system(HELP_TEXT);
                Ok(CommandOutcome::Continue)
            }
            SlashCommand::Reset => {
                self.manager.reset()?;
                self.controller.reset_transcript();
                self.session = None;
                Ok(CommandOutcome::SignedOut)
            }
            SlashCommand::Quit => Ok(CommandOutcome::Quit),
            SlashCommand::Unknown(command) => {
                self.controller
                    .push_system(format!("Unknown command: {command}"));
                Ok(CommandOutcome::Continue)
            }
        }
    }
}
