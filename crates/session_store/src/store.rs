use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SessionStoreError;
use crate::paths::session_file;
use crate::schema::SessionRecord;

/// File-backed store for the single session identity record.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at `base`, using the fixed state-dir and file name.
    #[must_use]
    pub fn at_dir(base: &Path) -> Self {
        Self {
            path: session_file(base),
        }
    }

    /// Store at an explicit file path.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record.
    ///
    /// A missing file and a file whose contents do not decode as the
    /// record shape both read as `None`; the caller then starts
    /// unauthenticated instead of failing startup.
    pub fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(SessionStoreError::io(
                    "reading session file",
                    &self.path,
                    error,
                ))
            }
        };

        Ok(serde_json::from_str::<SessionRecord>(&raw).ok())
    }

    /// Write the record, creating the state directory when needed.
    pub fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| SessionStoreError::io("creating state dir", parent, source))?;
        }

        let raw = serde_json::to_string(record)
            .map_err(|source| SessionStoreError::json_serialize(&self.path, source))?;

        fs::write(&self.path, raw)
            .map_err(|source| SessionStoreError::io("writing session file", &self.path, source))
    }

    /// Remove the persisted record unconditionally. Removing an absent
    /// record is not an error.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionStoreError::io(
                "removing session file",
                &self.path,
                error,
            )),
        }
    }
}
