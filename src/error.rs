//! Failure categories for the launch pipeline.

use thiserror::Error;

use crate::exit_codes;

/// Everything that can abort a launch, grouped by what the user must fix.
///
/// Ambient filesystem failures travel through [`LaunchError::Other`] with
/// their `anyhow` context intact; the named variants carry the categories
/// that map onto distinct exit codes.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Runtime-context marker absent, or a required configuration section
    /// missing from the engine defaults. Raised before any side effect.
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine package or executable could not be loaded after bootstrap.
    #[error("engine unavailable: {0} (not running inside a provisioned engine environment?)")]
    EngineUnavailable(String),

    /// The engine accepted the configuration but failed during the run.
    /// Terminal for the process; runs are never retried.
    #[error("engine run failed: {0}")]
    EngineRun(String),

    /// Filesystem and other ambient failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaunchError {
    /// Stable process exit code for this failure category.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Config(_) | LaunchError::Other(_) => exit_codes::INVALID,
            LaunchError::EngineUnavailable(_) => exit_codes::UNAVAILABLE,
            LaunchError::EngineRun(_) => exit_codes::ENGINE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let config = LaunchError::Config("missing marker".to_string());
        let unavailable = LaunchError::EngineUnavailable("no package".to_string());
        let engine = LaunchError::EngineRun("exit status 1".to_string());

        assert_eq!(config.exit_code(), exit_codes::INVALID);
        assert_eq!(unavailable.exit_code(), exit_codes::UNAVAILABLE);
        assert_eq!(engine.exit_code(), exit_codes::ENGINE);
    }

    #[test]
    fn unavailable_message_names_the_runtime_context() {
        let err = LaunchError::EngineUnavailable("engine package not found".to_string());
        assert!(err.to_string().contains("provisioned engine environment"));
    }
}
