//! Observability for stackfile
//!
//! - Structured logging (JSON lines on stderr)
//! - Begin/complete scopes around pipeline operations
//!
//! Observability is read-only: it never changes what a stage does and a
//! failure to log never fails an operation.
//!
//! ```ignore
//! use stackfile::observability::{Logger, ObservationScope, Severity};
//!
//! Logger::set_level(Severity::Trace);
//! Logger::info("PIPELINE_BUILT", &[("stages", "compression>encoding>storage")]);
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::ObservationScope;
