use std::fmt;

use screener_api::ScreenerApiError;
use session_store::{SessionRecord, SessionStore, SessionStoreError};

use crate::provider::ChatBackend;
use crate::transcript::{ChatMessage, ChatRole};

/// A stored thread id with this literal value is a leftover from a known
/// serialization bug; it must be treated as absent, never looked up.
pub const STALE_THREAD_SENTINEL: &str = "undefined";

#[derive(Debug)]
pub enum SessionError {
    Api(ScreenerApiError),
    Store(SessionStoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(error) => write!(f, "backend error: {error}"),
            Self::Store(error) => write!(f, "session store error: {error}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ScreenerApiError> for SessionError {
    fn from(error: ScreenerApiError) -> Self {
        Self::Api(error)
    }
}

impl From<SessionStoreError> for SessionError {
    fn from(error: SessionStoreError) -> Self {
        Self::Store(error)
    }
}

/// A validated identity plus the thread history fetched while validating.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub record: SessionRecord,
    pub history: Vec<ChatMessage>,
}

/// Establishes, validates and repairs the persisted (user, thread)
/// identity pair across client restarts.
pub struct SessionManager {
    store: SessionStore,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Resolve the persisted identity against the backend's authoritative
    /// state.
    ///
    /// Absent record ⇒ `Ok(None)` (unauthenticated). A present record is
    /// validated by fetching its thread; a vanished thread is silently
    /// repaired by creating a replacement thread for the same user and
    /// persisting it. Identity/thread trouble never surfaces as transcript
    /// errors.
    pub async fn resolve(
        &self,
        backend: &dyn ChatBackend,
    ) -> Result<Option<ResolvedSession>, SessionError> {
        let Some(record) = self.store.load()? else {
            return Ok(None);
        };

        let Ok(user_id) = record.user_id.parse::<i64>() else {
            tracing::warn!(user_id = %record.user_id, "persisted user id is not numeric; discarding session");
            return Ok(None);
        };

        if thread_reference_is_absent(&record.thread_id) {
            tracing::info!("persisted thread reference is unusable; creating a replacement");
            let record = self.repair_thread(backend, &record, user_id).await?;
            return Ok(Some(ResolvedSession {
                record,
                history: Vec::new(),
            }));
        }

        match backend.get_thread(&record.thread_id).await {
            Ok(thread) => Ok(Some(ResolvedSession {
                history: history_from_thread_messages(thread.messages),
                record,
            })),
            Err(ScreenerApiError::NotFound(detail)) => {
                tracing::info!(%detail, "persisted thread vanished; creating a replacement");
                let record = self.repair_thread(backend, &record, user_id).await?;
                Ok(Some(ResolvedSession {
                    record,
                    history: Vec::new(),
                }))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Create the (user, thread) pair for a fresh sign-in and persist it.
    ///
    /// A create-user conflict means the name is already registered; the
    /// embedded identity is adopted and the flow continues into thread
    /// creation. The conflict's name wins only when it is non-empty.
    pub async fn establish(
        &self,
        backend: &dyn ChatBackend,
        name: &str,
    ) -> Result<SessionRecord, SessionError> {
        let name = name.trim();

        let (user_id, user_name) = match backend.create_user(name).await {
            Ok(user) => (user.user_id, name.to_string()),
            Err(ScreenerApiError::UserExists {
                user_id,
                name: existing,
            }) => {
                tracing::info!(user_id, "adopting existing user identity");
                let user_name = existing
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| name.to_string());
                (user_id, user_name)
            }
            Err(error) => return Err(error.into()),
        };

        let thread_id = backend.create_thread(user_id).await?;
        let record = SessionRecord::new(user_id.to_string(), user_name, thread_id);
        self.store.save(&record)?;
        Ok(record)
    }

    /// Clear the persisted identity unconditionally.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        Ok(())
    }

    async fn repair_thread(
        &self,
        backend: &dyn ChatBackend,
        record: &SessionRecord,
        user_id: i64,
    ) -> Result<SessionRecord, SessionError> {
        let thread_id = backend.create_thread(user_id).await?;
        let repaired = record.with_thread_id(thread_id);
        self.store.save(&repaired)?;
        Ok(repaired)
    }
}

fn thread_reference_is_absent(thread_id: &str) -> bool {
    thread_id.trim().is_empty() || thread_id == STALE_THREAD_SENTINEL
}

fn history_from_thread_messages(
    messages: Vec<screener_api::ThreadMessage>,
) -> Vec<ChatMessage> {
    messages
        .into_iter()
        .map(|message| ChatMessage::new(
            message.id,
            ChatRole::parse(&message.role),
            message.content,
        ))
        .collect()
}
