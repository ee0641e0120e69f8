//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::stage::StageError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{code}: {0}", code = .0.code())]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("STACK_CLI_IO_ERROR: {0}")]
    Io(#[from] std::io::Error),

    #[error("STACK_CLI_IO_ERROR: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Stage(e) => e.code().code(),
            CliError::Io(_) | CliError::Json(_) => "STACK_CLI_IO_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
