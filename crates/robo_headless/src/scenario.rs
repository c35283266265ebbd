//! Scenario loading and configuration.
//!
//! A scenario sets up the simulated world: who starts where, how much
//! compute each robot gets per round, which strategies get sabotaged, and
//! how the turn scheduler is configured.

use std::path::Path;

use robo_core::config::{DriftPolicy, SchedulerConfig};
use robo_core::role::RobotRole;
use robo_core::team::Team;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategies::{SabotageMode, SabotageRule};
use crate::world::MAP_WIDTH;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed but unusable.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
    /// No built-in scenario with that name.
    #[error("Unknown built-in scenario: {0} (try one of: {})", Scenario::BUILTINS.join(", "))]
    UnknownBuiltin(String),
}

/// A robot placed at round 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotPlacement {
    /// Team.
    pub team: Team,
    /// Role.
    pub role: RobotRole,
    /// Starting cell.
    pub position: i32,
}

impl RobotPlacement {
    /// Create a placement.
    #[must_use]
    pub const fn new(team: Team, role: RobotRole, position: i32) -> Self {
        Self { team, role, position }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Round limit.
    pub rounds: u32,
    /// Per-robot, per-round compute ceiling.
    pub compute_ceiling: u32,
    /// Resources each team starts with.
    pub starting_resources: u32,
    /// Robots present at round 0.
    pub robots: Vec<RobotPlacement>,
    /// Fault injection rules.
    #[serde(default)]
    pub sabotage: Vec<SabotageRule>,
    /// Turn scheduler settings shared by every robot.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Names accepted by [`Scenario::builtin`].
    pub const BUILTINS: [&'static str; 2] = ["skirmish", "chaos"];

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Look up a built-in scenario by name.
    pub fn builtin(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "skirmish" => Ok(Self::skirmish()),
            "chaos" => Ok(Self::chaos()),
            other => Err(ScenarioError::UnknownBuiltin(other.to_string())),
        }
    }

    /// Check the scenario can be run.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.rounds == 0 {
            return Err(ScenarioError::Invalid("rounds must be at least 1".to_string()));
        }
        if self.compute_ceiling == 0 {
            return Err(ScenarioError::Invalid("compute_ceiling must be at least 1".to_string()));
        }
        if self.robots.is_empty() {
            return Err(ScenarioError::Invalid("no robots placed".to_string()));
        }
        if let Some(bad) = self.robots.iter().find(|r| !(0..MAP_WIDTH).contains(&r.position)) {
            return Err(ScenarioError::Invalid(format!(
                "{} {} at {} is off the map (0..{MAP_WIDTH})",
                bad.team, bad.role, bad.position
            )));
        }
        for (i, rule) in self.sabotage.iter().enumerate() {
            if self.sabotage[..i].iter().any(|r| r.role == rule.role) {
                return Err(ScenarioError::Invalid(format!(
                    "more than one sabotage rule for {}",
                    rule.role
                )));
            }
        }
        Ok(())
    }

    /// Both headquarters with an escort. No sabotage.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            name: "skirmish".to_string(),
            description: "Mirrored bases with demo strategies and no injected faults".to_string(),
            rounds: 200,
            compute_ceiling: 2_000,
            starting_resources: 200,
            robots: vec![
                RobotPlacement::new(Team::A, RobotRole::Headquarters, 2),
                RobotPlacement::new(Team::A, RobotRole::Carrier, 4),
                RobotPlacement::new(Team::A, RobotRole::Launcher, 5),
                RobotPlacement::new(Team::B, RobotRole::Headquarters, MAP_WIDTH - 3),
                RobotPlacement::new(Team::B, RobotRole::Carrier, MAP_WIDTH - 5),
                RobotPlacement::new(Team::B, RobotRole::Launcher, MAP_WIDTH - 6),
            ],
            sabotage: Vec::new(),
            scheduler: SchedulerConfig::default(),
        }
    }

    /// The skirmish with every fault class injected, and drift warnings on.
    #[must_use]
    pub fn chaos() -> Self {
        Self {
            name: "chaos".to_string(),
            description: "Skirmish with illegal actions, runtime faults, panics and compute overruns".to_string(),
            sabotage: vec![
                SabotageRule {
                    role: RobotRole::Carrier,
                    mode: SabotageMode::IllegalAction,
                    every: 3,
                },
                SabotageRule {
                    role: RobotRole::Launcher,
                    mode: SabotageMode::Panic,
                    every: 4,
                },
                SabotageRule {
                    role: RobotRole::Amplifier,
                    mode: SabotageMode::RuntimeFault,
                    every: 2,
                },
                SabotageRule {
                    role: RobotRole::Booster,
                    mode: SabotageMode::Overrun,
                    every: 10,
                },
            ],
            scheduler: SchedulerConfig {
                drift_policy: DriftPolicy::Warn,
                ..SchedulerConfig::default()
            },
            ..Self::skirmish()
        }
    }
}
