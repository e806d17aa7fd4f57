//! System utility functions

use std::path::{Path, PathBuf};

/// Get current UTC timestamp in RFC3339 format
pub fn now_utc() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Resolve a command name through PATH. Explicit paths are made absolute
/// when they exist, since commands may run from another directory.
pub fn pick_bin(name: &Path) -> PathBuf {
    if name.components().count() > 1 || name.is_absolute() {
        return name.canonicalize().unwrap_or_else(|_| name.to_path_buf());
    }
    which::which(name).unwrap_or_else(|_| name.to_path_buf())
}

/// Anchor a relative path at the current directory so it survives commands
/// that run from elsewhere
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
