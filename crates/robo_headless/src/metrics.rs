//! Match metrics.
//!
//! Collected by the driver from every [`TurnReport`] and serialized as JSON
//! by the CLI.

use std::collections::BTreeMap;

use robo_core::controller::RobotId;
use robo_core::fault::{FaultTier, TurnOutcome};
use robo_core::role::RobotRole;
use robo_core::scheduler::TurnReport;
use robo_core::team::Team;
use serde::{Deserialize, Serialize};

/// Per-role turn counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMetrics {
    /// Turns run.
    pub turns: u32,
    /// Turns whose strategy returned normally.
    pub completed: u32,
    /// Turns with nothing dispatched.
    pub idle: u32,
    /// Turns ending in an action rejection.
    pub action_faults: u32,
    /// Turns ending in a runtime fault or panic.
    pub runtime_faults: u32,
    /// Diagnostics that reached the sink.
    pub diagnostics: u32,
    /// Turns where the session counter lagged the round.
    pub drifted: u32,
}

impl RoleMetrics {
    /// Total faulted turns.
    #[must_use]
    pub const fn faults(&self) -> u32 {
        self.action_faults + self.runtime_faults
    }
}

/// A robot the host killed mid-turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationRecord {
    /// Robot ID.
    pub robot: RobotId,
    /// Role at the time.
    pub role: RobotRole,
    /// Team.
    pub team: Team,
    /// Round of the kill.
    pub round: u32,
    /// Host reason.
    pub reason: String,
}

/// Everything measured over one match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Per-round compute ceiling used.
    pub compute_ceiling: u32,
    /// Rounds fully played.
    pub rounds_played: u32,
    /// Counters keyed by role label.
    pub roles: BTreeMap<String, RoleMetrics>,
    /// Robots the host killed for overrunning.
    pub terminations: Vec<TerminationRecord>,
    /// Robots removed after resigning.
    pub resignations: u32,
    /// Robots destroyed in combat.
    pub destroyed: u32,
    /// Turns that did not yield exactly once. Always zero unless the
    /// scheduler is broken.
    pub yield_violations: u32,
    /// Robots left per team label.
    pub survivors: BTreeMap<String, usize>,
    /// Winning team label, if any.
    pub winner: Option<String>,
}

impl MatchMetrics {
    /// Empty metrics for a scenario.
    #[must_use]
    pub fn new(scenario: impl Into<String>, compute_ceiling: u32) -> Self {
        Self {
            scenario: scenario.into(),
            compute_ceiling,
            ..Default::default()
        }
    }

    /// Get or create a role's counters.
    pub fn role_mut(&mut self, role: RobotRole) -> &mut RoleMetrics {
        self.roles.entry(role.label().to_string()).or_default()
    }

    /// A role's counters, if it ever ran.
    #[must_use]
    pub fn role(&self, role: RobotRole) -> Option<&RoleMetrics> {
        self.roles.get(role.label())
    }

    /// Fold one turn report in.
    pub fn record_turn(&mut self, report: &TurnReport) {
        let role = self.role_mut(report.role);
        role.turns += 1;
        match &report.outcome {
            TurnOutcome::Completed => role.completed += 1,
            TurnOutcome::Idle => role.idle += 1,
            TurnOutcome::Faulted(fault) => match fault.tier() {
                FaultTier::Action => role.action_faults += 1,
                FaultTier::Runtime => role.runtime_faults += 1,
            },
        }
        if report.diagnostic_emitted {
            role.diagnostics += 1;
        }
        if report.drift.is_some() {
            role.drifted += 1;
        }
    }

    /// Total turns across roles.
    #[must_use]
    pub fn total_turns(&self) -> u32 {
        self.roles.values().map(|r| r.turns).sum()
    }

    /// Total faulted turns across roles.
    #[must_use]
    pub fn total_faults(&self) -> u32 {
        self.roles.values().map(RoleMetrics::faults).sum()
    }

    /// Set the outcome from the surviving robot counts.
    pub fn finalize(&mut self, rounds_played: u32, survivors_a: usize, survivors_b: usize) {
        self.rounds_played = rounds_played;
        self.survivors.insert(Team::A.to_string(), survivors_a);
        self.survivors.insert(Team::B.to_string(), survivors_b);
        self.winner = match (survivors_a, survivors_b) {
            (0, 0) => None,
            (_, 0) => Some(Team::A.to_string()),
            (0, _) => Some(Team::B.to_string()),
            _ => None,
        };
    }
}

/// Aggregate over several matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches run.
    pub matches: usize,
    /// Total turns.
    pub turns: u64,
    /// Total faulted turns.
    pub faults: u64,
    /// Total host terminations.
    pub terminations: usize,
    /// Total yield violations.
    pub yield_violations: u64,
    /// Wins per team label.
    pub wins: BTreeMap<String, usize>,
    /// Matches with no winner.
    pub draws: usize,
}

impl BatchSummary {
    /// Summarize `matches`.
    #[must_use]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        let mut summary = Self {
            matches: matches.len(),
            ..Default::default()
        };
        for m in matches {
            summary.turns += u64::from(m.total_turns());
            summary.faults += u64::from(m.total_faults());
            summary.terminations += m.terminations.len();
            summary.yield_violations += u64::from(m.yield_violations);
            match &m.winner {
                Some(team) => *summary.wins.entry(team.clone()).or_default() += 1,
                None => summary.draws += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use robo_core::fault::StrategyFault;

    use super::*;

    fn report(role: RobotRole, outcome: TurnOutcome) -> TurnReport {
        let diagnostic_emitted = outcome.is_fault();
        TurnReport {
            turn: 0,
            round: 0,
            role,
            outcome,
            diagnostic_emitted,
            drift: None,
        }
    }

    #[test]
    fn test_record_turn_buckets() {
        let mut metrics = MatchMetrics::new("test", 100);
        metrics.record_turn(&report(RobotRole::Carrier, TurnOutcome::Completed));
        metrics.record_turn(&report(
            RobotRole::Carrier,
            TurnOutcome::Faulted(StrategyFault::runtime("x")),
        ));
        metrics.record_turn(&report(RobotRole::Launcher, TurnOutcome::Idle));

        let carrier = metrics.role(RobotRole::Carrier).unwrap();
        assert_eq!(carrier.turns, 2);
        assert_eq!(carrier.runtime_faults, 1);
        assert_eq!(carrier.diagnostics, 1);
        assert_eq!(metrics.role(RobotRole::Launcher).unwrap().idle, 1);
        assert_eq!(metrics.total_turns(), 3);
        assert_eq!(metrics.total_faults(), 1);
    }

    #[test]
    fn test_finalize_winner() {
        let mut metrics = MatchMetrics::new("test", 100);
        metrics.finalize(10, 3, 0);
        assert_eq!(metrics.winner.as_deref(), Some("A"));
        metrics.finalize(10, 3, 2);
        assert_eq!(metrics.winner, None);
    }

    #[test]
    fn test_batch_summary() {
        let mut won = MatchMetrics::new("a", 100);
        won.finalize(5, 1, 0);
        let mut drawn = MatchMetrics::new("b", 100);
        drawn.finalize(5, 1, 1);
        let summary = BatchSummary::from_matches(&[won, drawn]);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.wins.get("A"), Some(&1));
    }

    #[test]
    fn test_metrics_serialize() {
        let mut metrics = MatchMetrics::new("json", 100);
        metrics.record_turn(&report(RobotRole::Booster, TurnOutcome::Completed));
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"BOOSTER\""));
    }
}
