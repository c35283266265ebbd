//! Host-side controller handed to each simulated robot.
//!
//! Every call is metered against a per-round compute ceiling. Going over
//! the ceiling kills the robot by raising a [`HostTermination`], the same
//! way a real host would end a bytecode-exhausted player.

use std::cell::RefCell;
use std::rc::Rc;

use robo_core::controller::{RobotController, RobotId};
use robo_core::fault::{ActionError, HostTermination};
use robo_core::role::RobotRole;
use robo_core::team::Team;

use crate::world::{RobotInfo, RobotState, SimWorld};

/// Cost of a plain query.
pub const QUERY_COST: u32 = 2;

/// Cost of a sensing call.
pub const SENSE_COST: u32 = 25;

/// Cost of an action attempt, successful or not.
pub const ACTION_COST: u32 = 10;

/// Capability handle for one simulated robot.
#[derive(Debug)]
pub struct SimController {
    world: Rc<RefCell<SimWorld>>,
    id: RobotId,
    role: RobotRole,
    team: Team,
    ceiling: u32,
    spent: u32,
    yields: u32,
}

impl SimController {
    /// Create a controller for an already-spawned robot.
    ///
    /// Returns `None` if `id` is not on the map.
    pub fn new(world: Rc<RefCell<SimWorld>>, id: RobotId, ceiling: u32) -> Option<Self> {
        let (role, team) = {
            let w = world.borrow();
            let robot = w.robot(id)?;
            (robot.role, robot.team)
        };
        Some(Self {
            world,
            id,
            role,
            team,
            ceiling,
            spent: 0,
            yields: 0,
        })
    }

    /// Reset the per-round meter. Called by the driver before each turn.
    pub fn begin_round(&mut self) {
        self.spent = 0;
    }

    /// Compute spent so far this round.
    #[must_use]
    pub const fn spent(&self) -> u32 {
        self.spent
    }

    /// Total yields since creation.
    #[must_use]
    pub const fn yields(&self) -> u32 {
        self.yields
    }

    /// Per-round compute ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Burn `cost` units of compute.
    ///
    /// Kills the robot if that takes it over the ceiling.
    pub fn burn(&mut self, cost: u32) {
        self.spent = self.spent.saturating_add(cost);
        if self.spent > self.ceiling {
            let round = self.world.borrow().round();
            HostTermination::new(
                round,
                format!("compute budget exceeded ({} > {})", self.spent, self.ceiling),
            )
            .raise();
        }
    }

    /// Snapshot of this robot's state.
    pub fn me(&mut self) -> Option<RobotState> {
        self.burn(QUERY_COST);
        self.world.borrow().robot(self.id).cloned()
    }

    /// Current position, or `None` if the robot is gone.
    pub fn position(&mut self) -> Option<i32> {
        self.burn(QUERY_COST);
        self.world.borrow().robot(self.id).map(|r| r.position)
    }

    /// Resources in this team's pool.
    pub fn team_resources(&mut self) -> u32 {
        self.burn(QUERY_COST);
        self.world.borrow().resources(self.team)
    }

    /// Position of a team's headquarters.
    pub fn headquarters(&mut self, team: Team) -> Option<i32> {
        self.burn(QUERY_COST);
        self.world.borrow().headquarters(team)
    }

    /// Robots within `radius`, nearest first.
    pub fn sense(&mut self, radius: i32) -> Vec<RobotInfo> {
        self.burn(SENSE_COST);
        self.world.borrow().nearby(self.id, radius)
    }

    /// Nearest enemy within `radius`.
    pub fn nearest_enemy(&mut self, radius: i32) -> Option<RobotInfo> {
        let enemy = self.team.opponent();
        self.sense(radius).into_iter().find(|r| r.team == enemy)
    }

    /// Move by `delta` cells.
    pub fn move_by(&mut self, delta: i32) -> Result<(), ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().move_by(self.id, delta)
    }

    /// Attack a robot.
    pub fn attack(&mut self, target: RobotId) -> Result<(), ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().attack(self.id, target)
    }

    /// Collect at the well.
    pub fn collect(&mut self) -> Result<(), ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().collect(self.id)
    }

    /// Deposit cargo at headquarters.
    pub fn deposit(&mut self) -> Result<u32, ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().deposit(self.id)
    }

    /// Build a robot.
    pub fn build(&mut self, role: RobotRole) -> Result<RobotId, ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().build(self.id, role)
    }

    /// Boost nearby allies.
    pub fn boost(&mut self) -> Result<usize, ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().boost(self.id)
    }

    /// Damage enemies around `center`.
    pub fn destabilize(&mut self, center: i32) -> Result<usize, ActionError> {
        self.burn(ACTION_COST);
        self.world.borrow_mut().destabilize(self.id, center)
    }
}

impl RobotController for SimController {
    fn id(&self) -> RobotId {
        self.id
    }

    fn role(&self) -> RobotRole {
        self.role
    }

    fn team(&self) -> Team {
        self.team
    }

    fn round_num(&self) -> u32 {
        self.world.borrow().round()
    }

    fn set_indicator_string(&mut self, text: &str) {
        self.world.borrow_mut().set_indicator(self.id, text);
    }

    fn resign(&mut self) {
        self.world.borrow_mut().resign(self.id);
    }

    fn yield_turn(&mut self) {
        self.yields += 1;
    }

    fn budget_remaining(&self) -> Option<u32> {
        Some(self.ceiling.saturating_sub(self.spent))
    }
}
