//! stackfile - layered compression and encoding over a plain file
//!
//! A pipeline is a stack of stages. The innermost stage stores text in a
//! file; decorators wrap it to compress and to make bytes text-safe.
//!
//! ```ignore
//! use stackfile::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::standard("data.txt");
//! pipeline.write_text("Sensitive data here")?;
//! assert_eq!(pipeline.read_text()?, "Sensitive data here");
//! ```

pub mod cli;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod stage;
