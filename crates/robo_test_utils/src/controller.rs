//! A controller that plays the host's part in tests.

use std::cell::Cell;

use robo_core::controller::{RobotController, RobotId};
use robo_core::fault::HostTermination;
use robo_core::role::RobotRole;
use robo_core::team::Team;

/// Default per-round compute ceiling.
pub const DEFAULT_CEILING: u32 = 10_000;

/// In-memory controller with counters for everything the scheduler does.
///
/// [`ScriptedController::spend`] models the host's compute meter: going over
/// the ceiling unwinds with [`HostTermination`], the same way a real host
/// would kill the robot.
#[derive(Debug, Clone)]
pub struct ScriptedController {
    /// Robot ID.
    pub id: RobotId,
    /// Role reported to the scheduler.
    pub role: RobotRole,
    /// Team reported to the scheduler.
    pub team: Team,
    /// Current host round.
    pub round: u32,
    /// Last indicator string set.
    pub indicator: Option<String>,
    /// Number of `yield_turn` calls.
    pub yields: u32,
    /// Number of `resign` calls.
    pub resigns: u32,
    /// Compute ceiling per round.
    pub ceiling: u32,
    /// Compute spent this round.
    pub spent: u32,
    role_reads: Cell<u32>,
}

impl ScriptedController {
    /// Create a controller for a robot first resumed in `round`.
    #[must_use]
    pub fn new(role: RobotRole, team: Team, round: u32) -> Self {
        Self {
            id: 1,
            role,
            team,
            round,
            indicator: None,
            yields: 0,
            resigns: 0,
            ceiling: DEFAULT_CEILING,
            spent: 0,
            role_reads: Cell::new(0),
        }
    }

    /// Set the compute ceiling.
    #[must_use]
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// How many times `role` has been read.
    #[must_use]
    pub fn role_reads(&self) -> u32 {
        self.role_reads.get()
    }

    /// Reset the role read counter.
    pub fn reset_role_reads(&mut self) {
        self.role_reads.set(0);
    }

    /// Advance the host to the next round.
    pub fn next_round(&mut self) {
        self.round += 1;
        self.spent = 0;
    }

    /// Charge `cost` compute units. Kills the robot past the ceiling.
    pub fn spend(&mut self, cost: u32) {
        self.spent = self.spent.saturating_add(cost);
        if self.spent > self.ceiling {
            HostTermination::new(
                self.round,
                format!("spent {} of {} compute", self.spent, self.ceiling),
            )
            .raise();
        }
    }
}

impl RobotController for ScriptedController {
    fn id(&self) -> RobotId {
        self.id
    }

    fn role(&self) -> RobotRole {
        self.role_reads.set(self.role_reads.get() + 1);
        self.role
    }

    fn team(&self) -> Team {
        self.team
    }

    fn round_num(&self) -> u32 {
        self.round
    }

    fn set_indicator_string(&mut self, text: &str) {
        self.indicator = Some(text.to_string());
    }

    fn resign(&mut self) {
        self.resigns += 1;
    }

    fn yield_turn(&mut self) {
        self.yields += 1;
    }

    fn budget_remaining(&self) -> Option<u32> {
        Some(self.ceiling.saturating_sub(self.spent))
    }
}
