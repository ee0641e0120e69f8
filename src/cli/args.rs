//! CLI argument definitions using clap
//!
//! Commands:
//! - stackfile write --config <path> [--text <s>]
//! - stackfile read --config <path>
//! - stackfile describe --config <path>
//! - stackfile demo --file <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// stackfile - layered compression and encoding over a plain file
#[derive(Parser, Debug)]
#[command(name = "stackfile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a payload through the configured pipeline
    Write {
        /// Path to configuration file
        #[arg(long, default_value = "./stackfile.json")]
        config: PathBuf,

        /// Payload text; stdin is read when omitted
        #[arg(long)]
        text: Option<String>,
    },

    /// Read the payload back and print it to stdout
    Read {
        /// Path to configuration file
        #[arg(long, default_value = "./stackfile.json")]
        config: PathBuf,
    },

    /// Print the configured stage chain
    Describe {
        /// Path to configuration file
        #[arg(long, default_value = "./stackfile.json")]
        config: PathBuf,
    },

    /// Round-trip a sample payload through compression > encoding > storage
    Demo {
        /// Backing file for the demo
        #[arg(long, default_value = "./stackfile-demo.txt")]
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
