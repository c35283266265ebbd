//! Diagnostic sinks that misbehave.

use robo_core::diagnostics::{DiagnosticSink, SinkError};

/// Sink that rejects every record, counting attempts.
#[derive(Debug, Default)]
pub struct FailingSink {
    /// Number of `emit` calls.
    pub attempts: u32,
}

impl DiagnosticSink for FailingSink {
    fn emit(&mut self, _role: &str, _detail: &str) -> Result<(), SinkError> {
        self.attempts += 1;
        Err(SinkError::Closed)
    }
}

/// Sink that panics on every record, counting attempts.
#[derive(Debug, Default)]
pub struct PanickingSink {
    /// Number of `emit` calls.
    pub attempts: u32,
}

impl DiagnosticSink for PanickingSink {
    fn emit(&mut self, role: &str, _detail: &str) -> Result<(), SinkError> {
        self.attempts += 1;
        panic!("sink exploded while reporting {role}");
    }
}
