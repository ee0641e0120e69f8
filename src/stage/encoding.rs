//! Base64 encoding stage
//!
//! Lets a text-only store carry arbitrary bytes. Write encodes to padded
//! base64; read decodes and rejects anything outside the alphabet.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::engine::GeneralPurpose;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::errors::{StageError, StageResult};
use super::{Stage, StageKind};
use crate::observability::Logger;

/// Base64 alphabet used on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// RFC 4648 standard alphabet (`+`, `/`), padded
    #[default]
    Standard,
    /// RFC 4648 URL-safe alphabet (`-`, `_`), padded
    UrlSafe,
}

impl Alphabet {
    fn engine(&self) -> &'static GeneralPurpose {
        match self {
            Alphabet::Standard => &STANDARD,
            Alphabet::UrlSafe => &URL_SAFE,
        }
    }

    /// Returns the configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Alphabet::Standard => "standard",
            Alphabet::UrlSafe => "url_safe",
        }
    }
}

/// Decorator that base64-encodes on write and decodes on read
#[derive(Debug)]
pub struct EncodingStage {
    inner: Box<dyn Stage>,
    alphabet: Alphabet,
}

impl EncodingStage {
    /// Wrap `inner` using the standard alphabet
    pub fn new(inner: Box<dyn Stage>) -> Self {
        Self::with_alphabet(inner, Alphabet::Standard)
    }

    /// Wrap `inner` using `alphabet`
    pub fn with_alphabet(inner: Box<dyn Stage>, alphabet: Alphabet) -> Self {
        Self { inner, alphabet }
    }

    /// Configured alphabet
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
}

impl Stage for EncodingStage {
    fn write(&self, payload: &[u8]) -> StageResult<()> {
        let encoded = self.alphabet.engine().encode(payload);
        Logger::trace(
            "ENCODING_WRITE",
            &[
                ("alphabet", self.alphabet.as_str()),
                ("input_bytes", payload.len().to_string().as_str()),
                ("output_bytes", encoded.len().to_string().as_str()),
            ],
        );
        self.inner.write(encoded.as_bytes())
    }

    fn read(&self) -> StageResult<Vec<u8>> {
        let encoded = self.inner.read()?;
        let decoded = self
            .alphabet
            .engine()
            .decode(encoded.trim_ascii())
            .map_err(|e| {
                StageError::encoding_failure(StageKind::Encoding, "invalid base64 payload")
                    .with_details(format!("alphabet: {}", self.alphabet.as_str()))
                    .with_source(e)
            })?;
        Logger::trace(
            "ENCODING_READ",
            &[
                ("alphabet", self.alphabet.as_str()),
                ("input_bytes", encoded.len().to_string().as_str()),
                ("output_bytes", decoded.len().to_string().as_str()),
            ],
        );
        Ok(decoded)
    }

    fn kind(&self) -> StageKind {
        StageKind::Encoding
    }

    fn inner(&self) -> Option<&dyn Stage> {
        Some(self.inner.as_ref())
    }
}
