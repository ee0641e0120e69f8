//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_FAILED` when finished
//! - Logs `{name}_INCOMPLETE` if dropped without either

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs start and end events around one operation
///
/// ```ignore
/// let scope = ObservationScope::with_fields("PIPELINE_WRITE", &[("stages", "compression>encoding>storage")]);
/// // ... do work ...
/// scope.complete_with_fields(&[("bytes", "42")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    started: Instant,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a new observation scope with fields repeated on every event
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started: Instant::now(),
        }
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    fn elapsed_us(&self) -> String {
        self.started.elapsed().as_micros().to_string()
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as successfully completed with additional fields
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.elapsed_us();
        let mut all_fields = self.field_refs();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("elapsed_us", elapsed.as_str()));
        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Mark the scope as failed with an error code and reason
    pub fn fail(self, code: &str, reason: &str) {
        self.completed.set(true);
        let mut all_fields = self.field_refs();
        all_fields.push(("code", code));
        all_fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &all_fields);
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::logger::capture_events;
    use serde_json::Value;

    fn events(output: &str) -> Vec<Value> {
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_scope_starts_incomplete() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.is_completed());
        scope.complete();
    }

    #[test]
    fn test_scope_with_fields() {
        let output = capture_events(|| {
            let scope = ObservationScope::with_fields("TEST", &[("stages", "storage")]);
            scope.complete_with_fields(&[("bytes", "0")]);
        });

        let events = events(&output);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "TEST_BEGIN");
        assert_eq!(events[0]["stages"], "storage");
        assert_eq!(events[1]["event"], "TEST_COMPLETE");
        assert_eq!(events[1]["severity"], "INFO");
        assert_eq!(events[1]["stages"], "storage");
        assert_eq!(events[1]["bytes"], "0");
        assert!(events[1]["elapsed_us"].is_string());
    }

    #[test]
    fn test_scope_fail() {
        let output = capture_events(|| {
            let scope = ObservationScope::with_fields("TEST", &[("stages", "storage")]);
            scope.fail("STACK_IO_FAILURE", "disk gone");
        });

        let events = events(&output);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["event"], "TEST_FAILED");
        assert_eq!(events[1]["severity"], "ERROR");
        assert_eq!(events[1]["code"], "STACK_IO_FAILURE");
        assert_eq!(events[1]["reason"], "disk gone");
        assert_eq!(events[1]["stages"], "storage");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let output = capture_events(|| {
            let scope = ObservationScope::new("TEST");
            drop(scope);
        });

        let events = events(&output);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "TEST_BEGIN");
        assert_eq!(events[1]["event"], "TEST_INCOMPLETE");
        assert_eq!(events[1]["severity"], "WARN");
        assert_eq!(events[1]["reason"], "scope dropped without completion");
    }
}
