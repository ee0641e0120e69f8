//! Stage error types
//!
//! Error codes:
//! - STACK_IO_FAILURE (ERROR severity)
//! - STACK_COMPRESSION_FAILURE (CORRUPTION severity)
//! - STACK_DECOMPRESSION_FAILURE (CORRUPTION severity)
//! - STACK_ENCODING_FAILURE (CORRUPTION severity)
//!
//! Every error records the stage that raised it. Stages never re-wrap an
//! inner stage's error, so the caller always sees the original origin.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use super::StageKind;

/// Severity levels for stage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Storage problem; the same call may succeed once the environment is fixed
    Error,
    /// Payload is corrupt or malformed; retrying cannot help
    Corruption,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Corruption => write!(f, "CORRUPTION"),
        }
    }
}

/// Stage error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageErrorCode {
    /// Backing store unavailable, unreadable, unwritable, or payload rejected
    /// by the store's text contract
    IoFailure,
    /// Codec refused to compress the payload
    CompressionFailure,
    /// Compressed stream is malformed, truncated or corrupt
    DecompressionFailure,
    /// Text-safe encoded payload could not be decoded
    EncodingFailure,
}

impl StageErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StageErrorCode::IoFailure => "STACK_IO_FAILURE",
            StageErrorCode::CompressionFailure => "STACK_COMPRESSION_FAILURE",
            StageErrorCode::DecompressionFailure => "STACK_DECOMPRESSION_FAILURE",
            StageErrorCode::EncodingFailure => "STACK_ENCODING_FAILURE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StageErrorCode::IoFailure => Severity::Error,
            StageErrorCode::CompressionFailure
            | StageErrorCode::DecompressionFailure
            | StageErrorCode::EncodingFailure => Severity::Corruption,
        }
    }
}

impl fmt::Display for StageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Stage error with full context
#[derive(Debug)]
pub struct StageError {
    code: StageErrorCode,
    stage: StageKind,
    message: String,
    details: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl StageError {
    fn new(code: StageErrorCode, stage: StageKind, message: impl Into<String>) -> Self {
        Self {
            code,
            stage,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Storage I/O failure with the underlying OS error
    pub fn io_failure(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StageErrorCode::IoFailure, StageKind::Storage, message).with_source(source)
    }

    /// Storage rejected the payload without touching the disk
    pub fn io_rejected(message: impl Into<String>) -> Self {
        Self::new(StageErrorCode::IoFailure, StageKind::Storage, message)
    }

    /// Compressor failure
    pub fn compression_failure(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(
            StageErrorCode::CompressionFailure,
            StageKind::Compression,
            message,
        )
        .with_source(source)
    }

    /// Decompressor failure
    pub fn decompression_failure(message: impl Into<String>) -> Self {
        Self::new(
            StageErrorCode::DecompressionFailure,
            StageKind::Compression,
            message,
        )
    }

    /// Encoded text rejected by the given stage
    pub fn encoding_failure(stage: StageKind, message: impl Into<String>) -> Self {
        Self::new(StageErrorCode::EncodingFailure, stage, message)
    }

    /// Attach extra context, e.g. a path or byte offset
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code
    pub fn code(&self) -> StageErrorCode {
        self.code
    }

    /// Returns the stage that raised the error
    pub fn stage(&self) -> StageKind {
        self.stage
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the payload itself is bad (as opposed to the store)
    pub fn is_corruption(&self) -> bool {
        self.severity() == Severity::Corruption
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.code.severity(),
            self.code.code(),
            self.stage,
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl StdError for StageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for stage operations
pub type StageResult<T> = Result<T, StageError>;
