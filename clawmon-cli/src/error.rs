//! CLI-specific error types and exit code mapping

use clawmon_core::error::ClawmonError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Daily pass or log analysis failure.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Database failure.
    #[error("store error: {0}")]
    Store(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from clawmon-core.
    #[error("{0}")]
    Core(#[from] ClawmonError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                       |
    /// |------|-------------------------------|
    /// | 0    | Success                       |
    /// | 1    | General / command error       |
    /// | 2    | Configuration error           |
    /// | 3    | Daily pass failed             |
    /// | 4    | Database error                |
    /// | 10   | IO error                      |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(ClawmonError::Config(_)) => 2,
            Self::Pipeline(_) => 3,
            Self::Store(_) | Self::Core(ClawmonError::Storage(_)) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<clawmon_log_pipeline::LogPipelineError> for CliError {
    fn from(e: clawmon_log_pipeline::LogPipelineError) -> Self {
        use clawmon_log_pipeline::LogPipelineError;
        match e {
            LogPipelineError::Config { .. } => Self::Config(e.to_string()),
            LogPipelineError::Store(_) => Self::Store(e.to_string()),
            other => Self::Pipeline(other.to_string()),
        }
    }
}

impl From<clawmon_store::StoreError> for CliError {
    fn from(e: clawmon_store::StoreError) -> Self {
        Self::Store(e.to_string())
    }
}
