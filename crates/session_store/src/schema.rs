use serde::{Deserialize, Serialize};

/// The persisted session identity.
///
/// A state file is exactly
/// `{"userId": ..., "userName": ..., "threadId": ...}`. Unknown fields are
/// rejected: anything else on disk is a different shape, not a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionRecord {
    pub user_id: String,
    pub user_name: String,
    pub thread_id: String,
}

impl SessionRecord {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            thread_id: thread_id.into(),
        }
    }

    /// Returns a copy of this record pointing at a different thread.
    #[must_use]
    pub fn with_thread_id(&self, thread_id: impl Into<String>) -> Self {
        Self {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            thread_id: thread_id.into(),
        }
    }
}
