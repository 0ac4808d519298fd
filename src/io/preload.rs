//! Best-effort forced loading of a shared library.

use std::fmt;
use std::path::Path;

use tracing::debug;

/// Outcome of the best-effort preload. Never escalated into an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadStatus {
    /// Library found and pinned into the process.
    Loaded,
    /// Library file does not exist; nothing was attempted.
    Missing,
    /// Loading was attempted and failed.
    Failed(String),
}

impl fmt::Display for PreloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreloadStatus::Loaded => write!(f, "loaded"),
            PreloadStatus::Missing => write!(f, "missing"),
            PreloadStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Force-load a shared library ahead of engine startup.
///
/// Some engine installs fail to resolve their native dependencies unless
/// this library is already mapped into the process. The outcome is reported
/// as a value, not raised: callers log it and continue.
pub fn preload_library(path: &Path) -> PreloadStatus {
    if !path.exists() {
        return PreloadStatus::Missing;
    }
    // SAFETY: the library is loaded only for its effect on the dynamic
    // linker, before any other thread exists; no symbols are resolved.
    match unsafe { libloading::Library::new(path) } {
        Ok(library) => {
            // Keep the mapping alive for the rest of the process.
            std::mem::forget(library);
            debug!(path = %path.display(), "preloaded shared library");
            PreloadStatus::Loaded
        }
        Err(err) => PreloadStatus::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_library_reports_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let status = preload_library(&temp.path().join("libnothere.so"));
        assert_eq!(status, PreloadStatus::Missing);
    }

    #[test]
    fn unloadable_file_reports_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("libbroken.so");
        fs::write(&path, "not a shared object").expect("write");

        match preload_library(&path) {
            PreloadStatus::Failed(_) => {}
            other => panic!("expected failure, got {other}"),
        }
    }
}
