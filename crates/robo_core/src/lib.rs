//! # Robo Core
//!
//! Per-robot turn scheduler for a tick-synchronous strategy simulation.
//!
//! Every robot gets one bounded turn per round. This crate owns the loop
//! that runs inside that turn:
//! - Read the robot's role from its controller
//! - Dispatch to the strategy registered for that role
//! - Contain any fault the strategy raises (rejected actions or logic bugs)
//! - Yield back to the host exactly once, then advance the turn counter
//!
//! The host (the thing that resumes robots each round and enforces the
//! compute ceiling) is not part of this crate. See `robo_headless` for a
//! simulated one.
//!
//! ## Crate Structure
//!
//! - [`scheduler`] - The per-turn entry point and failure boundary
//! - [`registry`] - Role to strategy dispatch table
//! - [`session`] - Per-robot lifecycle counters
//! - [`controller`] - The capability handle the host supplies
//! - [`fault`] - Action and runtime fault taxonomy
//! - [`diagnostics`] - Where fault records go
//! - [`config`] - Scheduler options (drift check, budget report)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod fault;
pub mod registry;
pub mod role;
pub mod scheduler;
pub mod session;
pub mod team;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{DriftPolicy, SchedulerConfig};
    pub use crate::controller::{RobotController, RobotId};
    pub use crate::diagnostics::{DiagnosticRecord, DiagnosticSink, SinkError, TracingSink};
    pub use crate::error::{Result, RoboError};
    pub use crate::fault::{
        ActionError, ActionErrorKind, FaultTier, HostTermination, StrategyFault, TurnOutcome,
    };
    pub use crate::registry::{RegistryBuilder, RoleRoster, Strategy, StrategyRegistry};
    pub use crate::role::RobotRole;
    pub use crate::scheduler::{TurnReport, TurnScheduler};
    pub use crate::session::AgentSession;
    pub use crate::team::Team;
}
