//! Zlib compression stage
//!
//! Deflates the whole payload on write and inflates the whole stream on
//! read. Output buffers grow as needed; the inflate loop runs until the
//! codec reports end of stream, so payloads of any size round-trip.
//!
//! A stream that ends early, carries trailing bytes, or fails the zlib
//! checksum is reported as `STACK_DECOMPRESSION_FAILURE`.
//!
//! Compressed bytes must never reach text storage directly. A write is
//! refused with `STACK_IO_FAILURE` when the first non-compression stage
//! below this one is storage, whatever the level or payload.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use super::errors::{StageError, StageResult};
use super::{Stage, StageKind};
use crate::observability::Logger;

/// Default zlib level, same as `Compression::default()`
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Minimum growth step for the inflate buffer
const INFLATE_CHUNK: usize = 8 * 1024;

/// Decorator that deflates on write and inflates on read
#[derive(Debug)]
pub struct CompressionStage {
    inner: Box<dyn Stage>,
    level: Compression,
}

impl CompressionStage {
    /// Wrap `inner` using the default compression level
    pub fn new(inner: Box<dyn Stage>) -> Self {
        Self::with_level(inner, DEFAULT_COMPRESSION_LEVEL)
    }

    /// Wrap `inner` with an explicit level. Levels above 9 are clamped.
    pub fn with_level(inner: Box<dyn Stage>, level: u32) -> Self {
        Self {
            inner,
            level: Compression::new(level.min(9)),
        }
    }

    /// Configured zlib level
    pub fn level(&self) -> u32 {
        self.level.level()
    }

    fn deflate(&self, input: &[u8]) -> StageResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(input.len() / 2 + 16), self.level);
        encoder
            .write_all(input)
            .map_err(|e| StageError::compression_failure("failed to deflate payload", e))?;
        encoder
            .finish()
            .map_err(|e| StageError::compression_failure("failed to finish deflate stream", e))
    }

    fn check_encoded_below(&self) -> StageResult<()> {
        let mut below: &dyn Stage = self.inner.as_ref();
        while below.kind() == StageKind::Compression {
            match below.inner() {
                Some(next) => below = next,
                None => break,
            }
        }

        if below.kind() == StageKind::Storage {
            return Err(StageError::io_rejected(
                "compressed bytes would reach text storage without encoding",
            )
            .with_details(format!("stage_below: {}", below.kind())));
        }
        Ok(())
    }
}

/// Inflates a complete zlib stream.
///
/// Every call hands the decoder the unconsumed input and fresh spare
/// capacity. A call that consumes nothing and produces nothing while there
/// is room to write means the input ran out before the end of stream.
fn inflate(input: &[u8]) -> StageResult<Vec<u8>> {
    let mut decoder = Decompress::new(true);
    let mut output: Vec<u8> = Vec::with_capacity(input.len().saturating_mul(4).max(INFLATE_CHUNK));

    loop {
        let consumed = decoder.total_in() as usize;
        let produced = decoder.total_out();
        if output.len() == output.capacity() {
            output.reserve(output.capacity().max(INFLATE_CHUNK));
        }

        let status = decoder
            .decompress_vec(&input[consumed..], &mut output, FlushDecompress::None)
            .map_err(|e| {
                StageError::decompression_failure("corrupt deflate stream")
                    .with_details(format!("input_offset: {}", decoder.total_in()))
                    .with_source(e)
            })?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let stalled =
                    decoder.total_in() as usize == consumed && decoder.total_out() == produced;
                if stalled && output.len() < output.capacity() {
                    return Err(StageError::decompression_failure(
                        "deflate stream ended before completion",
                    )
                    .with_details(format!("input_bytes: {}", input.len())));
                }
            }
        }
    }

    let consumed = decoder.total_in() as usize;
    if consumed != input.len() {
        return Err(
            StageError::decompression_failure("trailing bytes after deflate stream")
                .with_details(format!(
                    "stream_end: {}, input_bytes: {}",
                    consumed,
                    input.len()
                )),
        );
    }

    Ok(output)
}

impl Stage for CompressionStage {
    fn write(&self, payload: &[u8]) -> StageResult<()> {
        self.check_encoded_below()?;
        let compressed = self.deflate(payload)?;
        Logger::trace(
            "COMPRESSION_WRITE",
            &[
                ("input_bytes", payload.len().to_string().as_str()),
                ("output_bytes", compressed.len().to_string().as_str()),
            ],
        );
        self.inner.write(&compressed)
    }

    fn read(&self) -> StageResult<Vec<u8>> {
        let compressed = self.inner.read()?;
        let payload = inflate(&compressed)?;
        Logger::trace(
            "COMPRESSION_READ",
            &[
                ("input_bytes", compressed.len().to_string().as_str()),
                ("output_bytes", payload.len().to_string().as_str()),
            ],
        );
        Ok(payload)
    }

    fn kind(&self) -> StageKind {
        StageKind::Compression
    }

    fn inner(&self) -> Option<&dyn Stage> {
        Some(self.inner.as_ref())
    }
}
