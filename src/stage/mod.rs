//! Transformation stages
//!
//! A stage is a unit with two operations, `write` and `read`. The storage
//! stage owns the backing file; every other stage owns exactly one inner
//! stage and forwards to it after transforming the payload.
//!
//! # Invariants
//!
//! - `read()` immediately after `write(x)` returns `x`
//! - Stages hold no payload between calls
//! - Each operation calls exactly one inner stage
//! - Inner errors propagate unchanged

mod compression;
mod encoding;
mod errors;
mod storage;

pub use compression::{CompressionStage, DEFAULT_COMPRESSION_LEVEL};
pub use encoding::{Alphabet, EncodingStage};
pub use errors::{Severity, StageError, StageErrorCode, StageResult};
pub use storage::StorageStage;

use std::fmt;

/// Identifies which layer of a stack raised an error or performed work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Innermost file-backed stage
    Storage,
    /// Deflate/inflate decorator
    Compression,
    /// Base64 decorator
    Encoding,
    /// The pipeline's text boundary
    Pipeline,
}

impl StageKind {
    /// Returns the lowercase name used in logs and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Storage => "storage",
            StageKind::Compression => "compression",
            StageKind::Encoding => "encoding",
            StageKind::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common two-operation contract shared by every stage
pub trait Stage: Send + Sync + fmt::Debug {
    /// Transform `payload` and forward it inward (or persist it)
    fn write(&self, payload: &[u8]) -> StageResult<()>;

    /// Retrieve from inward and undo this stage's transformation
    fn read(&self) -> StageResult<Vec<u8>>;

    /// Which variant this stage is
    fn kind(&self) -> StageKind;

    /// The wrapped stage, `None` for the innermost stage
    fn inner(&self) -> Option<&dyn Stage>;
}
