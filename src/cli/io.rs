//! Stdin/stdout handling for the CLI
//!
//! - Payload input: all of stdin, UTF-8
//! - Command results: one JSON object per line on stdout

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Read the whole of stdin as text
pub fn read_payload() -> CliResult<String> {
    let mut payload = String::new();
    io::stdin().lock().read_to_string(&mut payload)?;
    Ok(payload)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write a raw payload to stdout without a trailing newline
pub fn write_payload(payload: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(payload.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
