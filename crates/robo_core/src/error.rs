//! Error types for scheduler setup.
//!
//! Faults raised while a turn is running are not errors in this sense; they
//! live in [`crate::fault`] and never leave the turn boundary.

use thiserror::Error;

use crate::role::RobotRole;

/// Result type alias using [`RoboError`].
pub type Result<T> = std::result::Result<T, RoboError>;

/// Errors raised while configuring a scheduler or building its registry.
#[derive(Debug, Error)]
pub enum RoboError {
    /// Config file does not exist.
    #[error("Scheduler config not found: {0}")]
    ConfigNotFound(String),

    /// Failed to read a config file.
    #[error("Failed to read scheduler config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse RON.
    #[error("Failed to parse scheduler config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// A role was given a second strategy.
    #[error("Role {0} already has a strategy")]
    DuplicateRole(RobotRole),
}
