//! CLI command implementations
//!
//! Every command except `demo` loads a `PipelineConfig`, applies its log
//! level, builds the pipeline and issues exactly one operation against it.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::config::PipelineConfig;
use crate::observability::Logger;
use crate::pipeline::Pipeline;

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{read_payload, write_payload, write_response};

/// Payload used by `demo`
const DEMO_PAYLOAD: &str = "Sensitive data here";

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Write { config, text } => write(&config, text),
        Command::Read { config } => read(&config),
        Command::Describe { config } => describe(&config),
        Command::Demo { file } => demo(&file),
    }
}

fn open(config_path: &Path) -> CliResult<(PipelineConfig, Pipeline)> {
    let config = PipelineConfig::load(config_path)?;
    config.apply_logging();
    Logger::info(
        "CONFIG_LOADED",
        &[("config", config_path.display().to_string().as_str())],
    );
    let pipeline = config.build();
    Ok((config, pipeline))
}

/// Write `text` (or stdin) through the configured pipeline
pub fn write(config_path: &Path, text: Option<String>) -> CliResult<()> {
    let (config, pipeline) = open(config_path)?;
    let payload = match text {
        Some(text) => text,
        None => read_payload()?,
    };

    pipeline.write_text(&payload)?;

    write_response(json!({
        "path": config.path.display().to_string(),
        "stages": pipeline.chain(),
        "bytes": payload.len(),
    }))
}

/// Read the payload through the configured pipeline and print it
pub fn read(config_path: &Path) -> CliResult<()> {
    let (_, pipeline) = open(config_path)?;
    let payload = pipeline.read_text()?;
    write_payload(&payload)
}

/// Print the stage chain and codec settings
pub fn describe(config_path: &Path) -> CliResult<()> {
    let (config, pipeline) = open(config_path)?;
    let stages: Vec<&str> = pipeline.describe().iter().map(|k| k.as_str()).collect();

    write_response(json!({
        "path": config.path.display().to_string(),
        "stages": stages,
        "compression_level": config.compression_level,
        "alphabet": config.alphabet.as_str(),
    }))
}

/// Round-trip the demo payload through compression > encoding > storage
pub fn demo(file: &Path) -> CliResult<()> {
    let pipeline = Pipeline::standard(file);

    pipeline.write_text(DEMO_PAYLOAD)?;
    let decoded = pipeline.read_text()?;
    let on_disk = fs::read_to_string(file)?;

    write_response(json!({
        "stages": pipeline.chain(),
        "written": DEMO_PAYLOAD,
        "on_disk": on_disk,
        "decoded": decoded,
        "roundtrip": decoded == DEMO_PAYLOAD,
    }))
}
