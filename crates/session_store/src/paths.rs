use std::path::{Path, PathBuf};

pub const STATE_DIR_NAME: &str = ".cv_screener";
pub const SESSION_FILE_NAME: &str = "session.json";

#[must_use]
pub fn session_root(base: &Path) -> PathBuf {
    base.join(STATE_DIR_NAME)
}

#[must_use]
pub fn session_file(base: &Path) -> PathBuf {
    session_root(base).join(SESSION_FILE_NAME)
}
