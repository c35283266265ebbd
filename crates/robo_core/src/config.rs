//! Scheduler options.
//!
//! Loaded from RON, for example:
//!
//! ```ron
//! (
//!     greeting: Some("Hello world!"),
//!     drift_policy: Warn,
//!     report_budget: true,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoboError};

/// What to do when the turn counter disagrees with the host's round number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriftPolicy {
    /// Don't check.
    #[default]
    Off,
    /// Log a warning and carry on.
    Warn,
    /// Log, call `resign` on the controller and skip the strategy that turn.
    Resign,
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Indicator string set once at startup.
    pub greeting: Option<String>,
    /// Turn counter consistency check.
    pub drift_policy: DriftPolicy,
    /// Log the remaining compute budget after each completed turn.
    pub report_budget: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            greeting: Some("Hello world!".to_string()),
            drift_policy: DriftPolicy::Off,
            report_budget: false,
        }
    }
}

impl SchedulerConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RoboError::ConfigNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: SchedulerConfig = ron::from_str(ron)?;
        Ok(config)
    }
}
