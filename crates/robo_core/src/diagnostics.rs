//! Diagnostic sinks for fault records.
//!
//! The scheduler emits one record per faulted turn. A sink may fail; the
//! scheduler absorbs the failure and still ends the turn normally.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Error returned by a sink that could not accept a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// Sink no longer accepts records.
    #[error("diagnostic sink closed")]
    Closed,
    /// Sink failed to write the record.
    #[error("diagnostic sink failed: {0}")]
    Failed(String),
}

/// Destination for fault records.
pub trait DiagnosticSink {
    /// Record a fault raised by the strategy for `role`.
    fn emit(&mut self, role: &str, detail: &str) -> Result<(), SinkError>;
}

/// Sink that writes each record as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, role: &str, detail: &str) -> Result<(), SinkError> {
        warn!(target: "robo::diagnostics", role, fault = detail, "strategy fault");
        Ok(())
    }
}

/// A captured fault record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Role label of the faulting strategy.
    pub role: String,
    /// Fault description.
    pub detail: String,
}

/// Collect records in memory.
impl DiagnosticSink for Vec<DiagnosticRecord> {
    fn emit(&mut self, role: &str, detail: &str) -> Result<(), SinkError> {
        self.push(DiagnosticRecord {
            role: role.to_string(),
            detail: detail.to_string(),
        });
        Ok(())
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, role: &str, detail: &str) -> Result<(), SinkError> {
        (**self).emit(role, detail)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn emit(&mut self, role: &str, detail: &str) -> Result<(), SinkError> {
        (**self).emit(role, detail)
    }
}
