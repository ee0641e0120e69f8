//! Pipeline composition
//!
//! A pipeline is an immutable stack of stages built once, bottom-up, from a
//! storage stage. Each `with` call wraps the current stack, so the last
//! stage added is the outermost and sees caller data first on write.
//!
//! Order matters. The working arrangement is
//!
//! ```text
//! compression > encoding > storage
//! ```
//!
//! which deflates, then makes the compressed bytes text-safe before they
//! reach the text-only store. Swapping the two decorators is legal, but
//! compression refuses to write onto storage with no encoding between
//! them, so every write fails with `STACK_IO_FAILURE` and the previous
//! contents stay in place.

use std::path::PathBuf;

use crate::observability::{Logger, ObservationScope};
use crate::stage::{
    Alphabet, CompressionStage, EncodingStage, Stage, StageError, StageKind, StageResult,
    StorageStage, DEFAULT_COMPRESSION_LEVEL,
};

/// Description of a decorating stage, used to build a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSpec {
    /// Zlib compression at the given level
    Compression { level: u32 },
    /// Base64 with the given alphabet
    Encoding { alphabet: Alphabet },
}

impl StageSpec {
    /// Compression at the default level
    pub fn compression() -> Self {
        StageSpec::Compression {
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Encoding with the standard alphabet
    pub fn encoding() -> Self {
        StageSpec::Encoding {
            alphabet: Alphabet::Standard,
        }
    }

    /// Which stage this spec builds
    pub fn kind(&self) -> StageKind {
        match self {
            StageSpec::Compression { .. } => StageKind::Compression,
            StageSpec::Encoding { .. } => StageKind::Encoding,
        }
    }

    fn wrap(self, inner: Box<dyn Stage>) -> Box<dyn Stage> {
        match self {
            StageSpec::Compression { level } => {
                Box::new(CompressionStage::with_level(inner, level))
            }
            StageSpec::Encoding { alphabet } => {
                Box::new(EncodingStage::with_alphabet(inner, alphabet))
            }
        }
    }
}

/// An immutable stack of stages with a text-facing API
#[derive(Debug)]
pub struct Pipeline {
    outer: Box<dyn Stage>,
    chain: String,
}

impl Pipeline {
    /// Use an already composed stack
    pub fn new(outer: Box<dyn Stage>) -> Self {
        let chain = describe_chain(outer.as_ref())
            .iter()
            .map(StageKind::as_str)
            .collect::<Vec<_>>()
            .join(">");
        Self { outer, chain }
    }

    /// `compression > encoding > storage` over `path`
    pub fn standard(path: impl Into<PathBuf>) -> Self {
        PipelineBuilder::new(StorageStage::new(path))
            .with(StageSpec::encoding())
            .with(StageSpec::compression())
            .build()
    }

    /// Write caller text through the whole stack
    pub fn write_text(&self, text: &str) -> StageResult<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Read through the whole stack and return the payload as text
    pub fn read_text(&self) -> StageResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            StageError::encoding_failure(StageKind::Pipeline, "payload is not valid UTF-8")
                .with_details(format!("valid_up_to: {}", e.utf8_error().valid_up_to()))
                .with_source(e)
        })
    }

    /// Write raw bytes through the whole stack
    pub fn write_bytes(&self, payload: &[u8]) -> StageResult<()> {
        let scope =
            ObservationScope::with_fields("PIPELINE_WRITE", &[("stages", self.chain.as_str())]);
        match self.outer.write(payload) {
            Ok(()) => {
                scope.complete_with_fields(&[("bytes", payload.len().to_string().as_str())]);
                Ok(())
            }
            Err(e) => {
                scope.fail(e.code().code(), &e.to_string());
                Err(e)
            }
        }
    }

    /// Read raw bytes through the whole stack
    pub fn read_bytes(&self) -> StageResult<Vec<u8>> {
        let scope =
            ObservationScope::with_fields("PIPELINE_READ", &[("stages", self.chain.as_str())]);
        match self.outer.read() {
            Ok(payload) => {
                scope.complete_with_fields(&[("bytes", payload.len().to_string().as_str())]);
                Ok(payload)
            }
            Err(e) => {
                scope.fail(e.code().code(), &e.to_string());
                Err(e)
            }
        }
    }

    /// Stage kinds from outermost to innermost
    pub fn describe(&self) -> Vec<StageKind> {
        describe_chain(self.outer.as_ref())
    }

    /// The stack as `outer>...>storage`
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Number of stages, storage included
    pub fn depth(&self) -> usize {
        self.describe().len()
    }
}

fn describe_chain(outer: &dyn Stage) -> Vec<StageKind> {
    let mut kinds = Vec::new();
    let mut current = Some(outer);
    while let Some(stage) = current {
        kinds.push(stage.kind());
        current = stage.inner();
    }
    kinds
}

/// Builds a pipeline bottom-up from a storage stage
#[derive(Debug)]
pub struct PipelineBuilder {
    stack: Box<dyn Stage>,
}

impl PipelineBuilder {
    /// Start from the innermost stage
    pub fn new(storage: StorageStage) -> Self {
        Self {
            stack: Box::new(storage),
        }
    }

    /// Wrap the current stack in one more stage
    pub fn with(mut self, spec: StageSpec) -> Self {
        self.stack = spec.wrap(self.stack);
        self
    }

    /// Wrap the current stack in each spec, first spec innermost
    pub fn with_all(self, specs: impl IntoIterator<Item = StageSpec>) -> Self {
        specs.into_iter().fold(self, PipelineBuilder::with)
    }

    /// Finish the stack
    pub fn build(self) -> Pipeline {
        let pipeline = Pipeline::new(self.stack);
        Logger::info("PIPELINE_BUILT", &[("stages", pipeline.chain())]);
        pipeline
    }
}
