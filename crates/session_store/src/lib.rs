//! Durable local persistence for the chat session identity.
//!
//! One JSON record under one fixed file: who the user is and which thread
//! they are conversing on. Absence or shape mismatch reads as "no session";
//! only genuine I/O trouble surfaces as an error.

mod error;
mod paths;
mod schema;
mod store;

pub use error::SessionStoreError;
pub use paths::{session_file, session_root, SESSION_FILE_NAME, STATE_DIR_NAME};
pub use schema::SessionRecord;
pub use store::SessionStore;
