//! Pipeline configuration
//!
//! A single JSON object describing one pipeline:
//!
//! ```json
//! {
//!   "path": "./data.txt",
//!   "stages": ["compression", "encoding"],
//!   "compression_level": 6,
//!   "alphabet": "standard",
//!   "log_level": "warn"
//! }
//! ```
//!
//! `stages` lists decorators outermost first. Storage is always the
//! innermost stage and is never listed. Unknown keys are rejected.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::{Logger, Severity};
use crate::pipeline::{Pipeline, PipelineBuilder, StageSpec};
use crate::stage::{Alphabet, StorageStage, DEFAULT_COMPRESSION_LEVEL};

/// Decorator names accepted in `stages`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Compression,
    Encoding,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Backing file (required)
    pub path: PathBuf,

    /// Decorators, outermost first (default: compression, encoding)
    #[serde(default = "default_stages")]
    pub stages: Vec<StageName>,

    /// Zlib level 0-9 (default 6)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Base64 alphabet (default standard)
    #[serde(default)]
    pub alphabet: Alphabet,

    /// Minimum log severity (default warn)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_stages() -> Vec<StageName> {
    vec![StageName::Compression, StageName::Encoding]
}
fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}
fn default_log_level() -> Severity {
    Severity::Warn
}

impl PipelineConfig {
    /// Default configuration for `path`
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stages: default_stages(),
            compression_level: default_compression_level(),
            alphabet: Alphabet::default(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("path must not be empty".to_string()));
        }

        if self.compression_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }

        for name in [StageName::Compression, StageName::Encoding] {
            if self.stages.iter().filter(|s| **s == name).count() > 1 {
                Logger::warn(
                    "CONFIG_DUPLICATE_STAGE",
                    &[("stage", self.stage_spec(name).kind().as_str())],
                );
            }
        }

        Ok(())
    }

    fn stage_spec(&self, name: StageName) -> StageSpec {
        match name {
            StageName::Compression => StageSpec::Compression {
                level: self.compression_level,
            },
            StageName::Encoding => StageSpec::Encoding {
                alphabet: self.alphabet,
            },
        }
    }

    /// Decorator specs, innermost first (the order a builder applies them)
    pub fn stage_specs(&self) -> Vec<StageSpec> {
        self.stages
            .iter()
            .rev()
            .map(|name| self.stage_spec(*name))
            .collect()
    }

    /// Apply the configured log level process-wide
    pub fn apply_logging(&self) {
        Logger::set_level(self.log_level);
    }

    /// Build the configured pipeline
    pub fn build(&self) -> Pipeline {
        PipelineBuilder::new(StorageStage::new(self.path.clone()))
            .with_all(self.stage_specs())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_json(r#"{"path": "data.txt"}"#).unwrap();
        assert_eq!(config.stages, vec![StageName::Compression, StageName::Encoding]);
        assert_eq!(config.compression_level, 6);
        assert_eq!(config.alphabet, Alphabet::Standard);
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_default_build_order() {
        let config = PipelineConfig::for_path("data.txt");
        assert_eq!(
            config.build().describe(),
            vec![StageKind::Compression, StageKind::Encoding, StageKind::Storage]
        );
    }

    #[test]
    fn test_custom_order_and_options() {
        let config = PipelineConfig::from_json(
            r#"{"path": "d.txt", "stages": ["encoding"], "alphabet": "url_safe", "log_level": "trace"}"#,
        )
        .unwrap();
        assert_eq!(
            config.stage_specs(),
            vec![StageSpec::Encoding {
                alphabet: Alphabet::UrlSafe
            }]
        );
        assert_eq!(config.log_level, Severity::Trace);
    }

    #[test]
    fn test_empty_stages_is_storage_only() {
        let config = PipelineConfig::from_json(r#"{"path": "d.txt", "stages": []}"#).unwrap();
        assert_eq!(config.build().describe(), vec![StageKind::Storage]);
    }

    #[test]
    fn test_rejects_bad_level() {
        let err = PipelineConfig::from_json(r#"{"path": "d.txt", "compression_level": 10}"#)
            .unwrap_err();
        assert_eq!(err.code(), "STACK_CONFIG_INVALID");
    }

    #[test]
    fn test_rejects_unknown_stage() {
        let err = PipelineConfig::from_json(r#"{"path": "d.txt", "stages": ["storage"]}"#)
            .unwrap_err();
        assert_eq!(err.code(), "STACK_CONFIG_PARSE_FAILED");
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = PipelineConfig::from_json(r#"{"path": "d.txt", "encrypt": true}"#).unwrap_err();
        assert_eq!(err.code(), "STACK_CONFIG_PARSE_FAILED");
    }

    #[test]
    fn test_rejects_missing_path() {
        assert!(PipelineConfig::from_json("{}").is_err());
        assert!(PipelineConfig::from_json(r#"{"path": ""}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("stackfile.json");
        fs::write(&config_path, r#"{"path": "data.txt", "compression_level": 9}"#).unwrap();

        let config = PipelineConfig::load(&config_path).unwrap();
        assert_eq!(config.compression_level, 9);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = PipelineConfig::load(&temp.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), "STACK_CONFIG_READ_FAILED");
    }
}
