//! # Robo Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Scripted controller standing in for a host
//! - Scripted strategies with shared call logs
//! - Failing and panicking diagnostic sinks
//! - Round-driving harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod controller;
pub mod harness;
pub mod props;
pub mod sinks;
pub mod strategies;

pub use controller::ScriptedController;
pub use harness::{run_rounds, RoundsResult};
pub use sinks::{FailingSink, PanickingSink};
pub use strategies::{CallLog, ScriptedStrategy, Step};

/// Re-export proptest for convenience.
pub use proptest;
