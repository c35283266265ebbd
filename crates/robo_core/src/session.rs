//! Per-robot session state.

use serde::{Deserialize, Serialize};

use crate::role::RobotRole;
use crate::team::Team;

/// Lifecycle counters for one robot.
///
/// Owned by that robot's [`crate::scheduler::TurnScheduler`]. Identity
/// fields are fixed at construction; only the turn counter moves, and only
/// forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    role: RobotRole,
    team: Team,
    opponent: Team,
    creation_round: u32,
    turn_count: u32,
}

impl AgentSession {
    /// Start a session for a robot first seen in `creation_round`.
    #[must_use]
    pub const fn new(role: RobotRole, team: Team, creation_round: u32) -> Self {
        Self {
            role,
            team,
            opponent: team.opponent(),
            creation_round,
            turn_count: 0,
        }
    }

    /// Role recorded at startup.
    #[must_use]
    pub const fn role(&self) -> RobotRole {
        self.role
    }

    /// Own team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Opposing team.
    #[must_use]
    pub const fn opponent(&self) -> Team {
        self.opponent
    }

    /// Host round of the first invocation.
    #[must_use]
    pub const fn creation_round(&self) -> u32 {
        self.creation_round
    }

    /// Turns completed so far.
    #[must_use]
    pub const fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Turns that should have completed by the start of `round`.
    #[must_use]
    pub const fn expected_turns(&self, round: u32) -> u32 {
        round.saturating_sub(self.creation_round)
    }

    /// Expected turn count if it disagrees with the actual one.
    ///
    /// A robot that overran its budget in an earlier round loses that turn,
    /// so its counter falls behind the host's round number.
    #[must_use]
    pub const fn drift(&self, round: u32) -> Option<u32> {
        let expected = self.expected_turns(round);
        if expected == self.turn_count {
            None
        } else {
            Some(expected)
        }
    }

    /// Record one finished turn and return the new count.
    pub(crate) fn complete_turn(&mut self) -> u32 {
        self.turn_count += 1;
        self.turn_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_zero() {
        let session = AgentSession::new(RobotRole::Launcher, Team::A, 10);
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.creation_round(), 10);
        assert_eq!(session.opponent(), Team::B);
    }

    #[test]
    fn test_complete_turn_is_monotonic() {
        let mut session = AgentSession::new(RobotRole::Carrier, Team::B, 0);
        for expected in 1..=50 {
            assert_eq!(session.complete_turn(), expected);
        }
        assert_eq!(session.turn_count(), 50);
        assert_eq!(session.opponent(), Team::A);
    }

    #[test]
    fn test_drift_detection() {
        let mut session = AgentSession::new(RobotRole::Booster, Team::A, 10);
        assert_eq!(session.drift(10), None);
        session.complete_turn();
        assert_eq!(session.drift(11), None);
        // Lost a round.
        assert_eq!(session.drift(13), Some(3));
    }

    #[test]
    fn test_expected_turns_before_creation_is_zero() {
        let session = AgentSession::new(RobotRole::Amplifier, Team::B, 5);
        assert_eq!(session.expected_turns(3), 0);
    }
}
