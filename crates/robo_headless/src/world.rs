//! A deliberately small two-team world.
//!
//! Positions are one-dimensional (`0..MAP_WIDTH`). Team A's headquarters
//! sits near the left edge, team B's near the right, and a resource well
//! sits in the middle. Every action is validated the way a real host would
//! and rejected with an [`ActionError`].

use std::collections::BTreeMap;

use robo_core::controller::RobotId;
use robo_core::fault::{ActionError, ActionErrorKind};
use robo_core::role::RobotRole;
use robo_core::team::Team;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Map width in cells.
pub const MAP_WIDTH: i32 = 60;

/// Resource well position.
pub const WELL_POSITION: i32 = MAP_WIDTH / 2;

/// Max distance for attacks, collection and deposits.
pub const ACTION_RADIUS: i32 = 4;

/// Max distance for sensing.
pub const SENSE_RADIUS: i32 = 12;

/// Carrier cargo capacity.
pub const CARGO_CAPACITY: u32 = 40;

/// Cargo picked up per collect.
pub const COLLECT_AMOUNT: u32 = 10;

/// Resource cost to build a robot of `role`. `None` if it can't be built.
#[must_use]
pub const fn build_cost(role: RobotRole) -> Option<u32> {
    match role {
        RobotRole::Headquarters => None,
        RobotRole::Carrier => Some(50),
        RobotRole::Launcher => Some(60),
        RobotRole::Booster => Some(80),
        RobotRole::Destabilizer => Some(100),
        RobotRole::Amplifier => Some(40),
    }
}

/// Starting health for `role`.
#[must_use]
pub const fn max_health(role: RobotRole) -> i32 {
    match role {
        RobotRole::Headquarters => 1000,
        RobotRole::Carrier => 60,
        RobotRole::Launcher => 100,
        RobotRole::Booster => 80,
        RobotRole::Destabilizer => 90,
        RobotRole::Amplifier => 70,
    }
}

/// Damage dealt by one attack from `role`.
#[must_use]
pub const fn attack_damage(role: RobotRole) -> Option<i32> {
    match role {
        RobotRole::Headquarters => Some(10),
        RobotRole::Launcher => Some(20),
        _ => None,
    }
}

/// Full state of one robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotState {
    /// Robot ID.
    pub id: RobotId,
    /// Role.
    pub role: RobotRole,
    /// Team.
    pub team: Team,
    /// Position on the line.
    pub position: i32,
    /// Remaining health.
    pub health: i32,
    /// Resources carried (carriers only).
    pub cargo: u32,
    /// Rounds until the next action.
    pub action_cooldown: u32,
    /// Rounds until the next move.
    pub move_cooldown: u32,
    /// Last indicator string.
    pub indicator: String,
    /// Set when the robot resigned.
    pub resigned: bool,
}

/// What a robot can learn about another by sensing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotInfo {
    /// Robot ID.
    pub id: RobotId,
    /// Role.
    pub role: RobotRole,
    /// Team.
    pub team: Team,
    /// Position.
    pub position: i32,
    /// Remaining health.
    pub health: i32,
}

impl From<&RobotState> for RobotInfo {
    fn from(state: &RobotState) -> Self {
        Self {
            id: state.id,
            role: state.role,
            team: state.team,
            position: state.position,
            health: state.health,
        }
    }
}

/// The shared world all controllers act on.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    round: u32,
    robots: BTreeMap<RobotId, RobotState>,
    next_id: RobotId,
    resources: [u32; 2],
    pending_spawns: Vec<RobotId>,
}

impl SimWorld {
    /// Create an empty world where each team starts with `starting_resources`.
    #[must_use]
    pub fn new(starting_resources: u32) -> Self {
        Self {
            round: 0,
            robots: BTreeMap::new(),
            next_id: 1,
            resources: [starting_resources; 2],
            pending_spawns: Vec::new(),
        }
    }

    /// Current round.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Advance to the next round and tick cooldowns down.
    pub fn advance_round(&mut self) {
        self.round += 1;
        for robot in self.robots.values_mut() {
            robot.action_cooldown = robot.action_cooldown.saturating_sub(1);
            robot.move_cooldown = robot.move_cooldown.saturating_sub(1);
        }
    }

    /// Place a robot. It is resumed for the first time on the next driver step.
    pub fn spawn(&mut self, role: RobotRole, team: Team, position: i32) -> RobotId {
        let id = self.next_id;
        self.next_id += 1;
        self.robots.insert(
            id,
            RobotState {
                id,
                role,
                team,
                position: position.clamp(0, MAP_WIDTH - 1),
                health: max_health(role),
                cargo: 0,
                action_cooldown: 0,
                move_cooldown: 0,
                indicator: String::new(),
                resigned: false,
            },
        );
        self.pending_spawns.push(id);
        id
    }

    /// Robots spawned since the last call.
    pub fn take_spawns(&mut self) -> Vec<RobotId> {
        std::mem::take(&mut self.pending_spawns)
    }

    /// Look up a robot.
    #[must_use]
    pub fn robot(&self, id: RobotId) -> Option<&RobotState> {
        self.robots.get(&id)
    }

    /// Look up a robot mutably.
    pub fn robot_mut(&mut self, id: RobotId) -> Option<&mut RobotState> {
        self.robots.get_mut(&id)
    }

    /// Whether a robot is still on the map.
    #[must_use]
    pub fn is_alive(&self, id: RobotId) -> bool {
        self.robots.contains_key(&id)
    }

    /// Remove a robot from the map.
    pub fn remove(&mut self, id: RobotId) -> Option<RobotState> {
        self.robots.remove(&id)
    }

    /// All robot IDs in ascending order.
    #[must_use]
    pub fn robot_ids(&self) -> Vec<RobotId> {
        self.robots.keys().copied().collect()
    }

    /// Number of robots on `team`.
    #[must_use]
    pub fn count(&self, team: Team) -> usize {
        self.robots.values().filter(|r| r.team == team).count()
    }

    /// Team resource pool.
    #[must_use]
    pub const fn resources(&self, team: Team) -> u32 {
        self.resources[team.index()]
    }

    /// Position of `team`'s first headquarters.
    #[must_use]
    pub fn headquarters(&self, team: Team) -> Option<i32> {
        self.robots
            .values()
            .find(|r| r.team == team && r.role == RobotRole::Headquarters)
            .map(|r| r.position)
    }

    /// Robots within `radius` of `id`, nearest first, excluding `id`.
    #[must_use]
    pub fn nearby(&self, id: RobotId, radius: i32) -> Vec<RobotInfo> {
        let Some(origin) = self.robots.get(&id).map(|r| r.position) else {
            return Vec::new();
        };
        let mut found: Vec<RobotInfo> = self
            .robots
            .values()
            .filter(|r| r.id != id && (r.position - origin).abs() <= radius)
            .map(RobotInfo::from)
            .collect();
        found.sort_by_key(|r| ((r.position - origin).abs(), r.id));
        found
    }

    fn actor(&self, id: RobotId) -> Result<&RobotState, ActionError> {
        self.robots
            .get(&id)
            .ok_or_else(|| ActionError::new(ActionErrorKind::CantDoThat, format!("robot {id} is gone")))
    }

    fn ready_to_act(&self, id: RobotId) -> Result<&RobotState, ActionError> {
        let actor = self.actor(id)?;
        if actor.action_cooldown > 0 {
            return Err(ActionError::new(
                ActionErrorKind::NotReady,
                format!("action cooldown {}", actor.action_cooldown),
            ));
        }
        Ok(actor)
    }

    /// Move a robot by `delta` cells.
    pub fn move_by(&mut self, id: RobotId, delta: i32) -> Result<(), ActionError> {
        let actor = self.actor(id)?;
        if actor.role.is_building() {
            return Err(ActionError::new(ActionErrorKind::CantMoveThere, "buildings cannot move"));
        }
        if actor.move_cooldown > 0 {
            return Err(ActionError::new(
                ActionErrorKind::NotReady,
                format!("move cooldown {}", actor.move_cooldown),
            ));
        }
        let target = actor.position + delta;
        if !(0..MAP_WIDTH).contains(&target) {
            return Err(ActionError::new(
                ActionErrorKind::CantMoveThere,
                format!("cell {target} is off the map"),
            ));
        }
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.position = target;
            robot.move_cooldown = 1;
        }
        Ok(())
    }

    /// Attack another robot.
    pub fn attack(&mut self, id: RobotId, target: RobotId) -> Result<(), ActionError> {
        let actor = self.ready_to_act(id)?;
        let Some(damage) = attack_damage(actor.role) else {
            return Err(ActionError::new(
                ActionErrorKind::CantDoThat,
                format!("{} cannot attack", actor.role),
            ));
        };
        let (team, position) = (actor.team, actor.position);
        let victim = self.robots.get(&target).ok_or_else(|| {
            ActionError::new(ActionErrorKind::InvalidTarget, format!("robot {target} not found"))
        })?;
        if victim.team == team {
            return Err(ActionError::new(
                ActionErrorKind::InvalidTarget,
                format!("robot {target} is friendly"),
            ));
        }
        let distance = (victim.position - position).abs();
        if distance > ACTION_RADIUS {
            return Err(ActionError::new(
                ActionErrorKind::OutOfRange,
                format!("robot {target} is {distance} cells away"),
            ));
        }
        self.set_action_cooldown(id, 2);
        self.damage(target, damage);
        Ok(())
    }

    /// Damage every enemy within 2 cells of `center`.
    pub fn destabilize(&mut self, id: RobotId, center: i32) -> Result<usize, ActionError> {
        let actor = self.ready_to_act(id)?;
        if actor.role != RobotRole::Destabilizer {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, "only destabilizers can destabilize"));
        }
        let (team, position) = (actor.team, actor.position);
        if (center - position).abs() > ACTION_RADIUS {
            return Err(ActionError::new(
                ActionErrorKind::OutOfRange,
                format!("cell {center} is out of range"),
            ));
        }
        let victims: Vec<RobotId> = self
            .robots
            .values()
            .filter(|r| r.team != team && (r.position - center).abs() <= 2)
            .map(|r| r.id)
            .collect();
        self.set_action_cooldown(id, 4);
        for victim in &victims {
            self.damage(*victim, 8);
        }
        Ok(victims.len())
    }

    /// Clear cooldowns of nearby allies.
    pub fn boost(&mut self, id: RobotId) -> Result<usize, ActionError> {
        let actor = self.ready_to_act(id)?;
        if actor.role != RobotRole::Booster {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, "only boosters can boost"));
        }
        let (team, position) = (actor.team, actor.position);
        let mut boosted = 0;
        for robot in self.robots.values_mut() {
            if robot.id != id && robot.team == team && (robot.position - position).abs() <= ACTION_RADIUS {
                robot.move_cooldown = 0;
                boosted += 1;
            }
        }
        self.set_action_cooldown(id, 5);
        Ok(boosted)
    }

    /// Pick up resources at the well.
    pub fn collect(&mut self, id: RobotId) -> Result<(), ActionError> {
        let actor = self.ready_to_act(id)?;
        if actor.role != RobotRole::Carrier {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, "only carriers collect"));
        }
        if (actor.position - WELL_POSITION).abs() > ACTION_RADIUS {
            return Err(ActionError::new(ActionErrorKind::OutOfRange, "no well in range"));
        }
        if actor.cargo >= CARGO_CAPACITY {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, "cargo full"));
        }
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.cargo = (robot.cargo + COLLECT_AMOUNT).min(CARGO_CAPACITY);
            robot.action_cooldown = 1;
        }
        Ok(())
    }

    /// Hand cargo to the team's headquarters.
    pub fn deposit(&mut self, id: RobotId) -> Result<u32, ActionError> {
        let actor = self.ready_to_act(id)?;
        let team = actor.team;
        let cargo = actor.cargo;
        let Some(home) = self.headquarters(team) else {
            return Err(ActionError::new(ActionErrorKind::InvalidTarget, "no headquarters left"));
        };
        if (actor.position - home).abs() > ACTION_RADIUS {
            return Err(ActionError::new(ActionErrorKind::OutOfRange, "headquarters out of range"));
        }
        if cargo == 0 {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, "nothing to deposit"));
        }
        self.resources[team.index()] += cargo;
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.cargo = 0;
        }
        Ok(cargo)
    }

    /// Build a new robot next to a headquarters.
    pub fn build(&mut self, id: RobotId, role: RobotRole) -> Result<RobotId, ActionError> {
        let actor = self.ready_to_act(id)?;
        if actor.role != RobotRole::Headquarters {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, "only headquarters build"));
        }
        let Some(cost) = build_cost(role) else {
            return Err(ActionError::new(ActionErrorKind::CantDoThat, format!("{role} cannot be built")));
        };
        let (team, position) = (actor.team, actor.position);
        let available = self.resources[team.index()];
        if available < cost {
            return Err(ActionError::new(
                ActionErrorKind::NotEnoughResource,
                format!("{role} costs {cost}, have {available}"),
            ));
        }
        self.resources[team.index()] -= cost;
        self.set_action_cooldown(id, 3);
        let toward_center = if position < WELL_POSITION { 1 } else { -1 };
        let spawned = self.spawn(role, team, position + toward_center);
        debug!(builder = id, spawned, role = %role, team = %team, "robot built");
        Ok(spawned)
    }

    /// Attach an indicator string to a robot.
    pub fn set_indicator(&mut self, id: RobotId, text: &str) {
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.indicator = text.to_string();
        }
    }

    /// Mark a robot as resigned.
    pub fn resign(&mut self, id: RobotId) {
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.resigned = true;
        }
    }

    fn set_action_cooldown(&mut self, id: RobotId, rounds: u32) {
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.action_cooldown = rounds;
        }
    }

    fn damage(&mut self, id: RobotId, amount: i32) {
        let destroyed = match self.robots.get_mut(&id) {
            Some(robot) => {
                robot.health -= amount;
                robot.health <= 0
            }
            None => false,
        };
        if destroyed {
            self.robots.remove(&id);
            debug!(robot = id, round = self.round, "robot destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_robots(a: RobotRole, a_pos: i32, b: RobotRole, b_pos: i32) -> (SimWorld, RobotId, RobotId) {
        let mut world = SimWorld::new(100);
        let first = world.spawn(a, Team::A, a_pos);
        let second = world.spawn(b, Team::B, b_pos);
        (world, first, second)
    }

    #[test]
    fn test_spawn_queues_pending() {
        let mut world = SimWorld::new(0);
        let id = world.spawn(RobotRole::Carrier, Team::A, 3);
        assert_eq!(world.take_spawns(), vec![id]);
        assert!(world.take_spawns().is_empty());
        assert!(world.is_alive(id));
    }

    #[test]
    fn test_attack_out_of_range() {
        let (mut world, a, b) = two_robots(RobotRole::Launcher, 10, RobotRole::Carrier, 20);
        let err = world.attack(a, b).unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::OutOfRange);
    }

    #[test]
    fn test_attack_then_cooldown() {
        let (mut world, a, b) = two_robots(RobotRole::Launcher, 10, RobotRole::Carrier, 12);
        world.attack(a, b).unwrap();
        assert_eq!(world.robot(b).unwrap().health, 40);
        let err = world.attack(a, b).unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::NotReady);
    }

    #[test]
    fn test_attack_friendly_is_invalid() {
        let mut world = SimWorld::new(0);
        let a = world.spawn(RobotRole::Launcher, Team::A, 10);
        let b = world.spawn(RobotRole::Carrier, Team::A, 11);
        assert_eq!(world.attack(a, b).unwrap_err().kind, ActionErrorKind::InvalidTarget);
    }

    #[test]
    fn test_carrier_cannot_attack() {
        let (mut world, a, b) = two_robots(RobotRole::Carrier, 10, RobotRole::Carrier, 11);
        assert_eq!(world.attack(a, b).unwrap_err().kind, ActionErrorKind::CantDoThat);
    }

    #[test]
    fn test_lethal_damage_removes_robot() {
        let (mut world, a, b) = two_robots(RobotRole::Launcher, 10, RobotRole::Carrier, 12);
        for _ in 0..3 {
            world.attack(a, b).unwrap();
            world.advance_round();
            world.advance_round();
        }
        assert!(!world.is_alive(b));
    }

    #[test]
    fn test_headquarters_cannot_move() {
        let mut world = SimWorld::new(0);
        let hq = world.spawn(RobotRole::Headquarters, Team::A, 2);
        assert_eq!(world.move_by(hq, 1).unwrap_err().kind, ActionErrorKind::CantMoveThere);
    }

    #[test]
    fn test_move_off_map() {
        let mut world = SimWorld::new(0);
        let carrier = world.spawn(RobotRole::Carrier, Team::A, 0);
        assert_eq!(world.move_by(carrier, -1).unwrap_err().kind, ActionErrorKind::CantMoveThere);
    }

    #[test]
    fn test_build_spends_resources() {
        let mut world = SimWorld::new(100);
        let hq = world.spawn(RobotRole::Headquarters, Team::A, 2);
        world.take_spawns();
        let carrier = world.build(hq, RobotRole::Carrier).unwrap();
        assert_eq!(world.resources(Team::A), 50);
        assert_eq!(world.robot(carrier).unwrap().position, 3);
        assert_eq!(world.take_spawns(), vec![carrier]);
        world.advance_round();
        world.advance_round();
        world.advance_round();
        let err = world.build(hq, RobotRole::Launcher).unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::NotEnoughResource);
    }

    #[test]
    fn test_collect_and_deposit() {
        let mut world = SimWorld::new(0);
        let hq = world.spawn(RobotRole::Headquarters, Team::A, WELL_POSITION - 3);
        let carrier = world.spawn(RobotRole::Carrier, Team::A, WELL_POSITION);
        world.collect(carrier).unwrap();
        world.advance_round();
        let deposited = world.deposit(carrier).unwrap();
        assert_eq!(deposited, COLLECT_AMOUNT);
        assert_eq!(world.resources(Team::A), COLLECT_AMOUNT);
        assert!(world.is_alive(hq));
    }

    #[test]
    fn test_destabilize_hits_cluster() {
        let mut world = SimWorld::new(0);
        let d = world.spawn(RobotRole::Destabilizer, Team::A, 10);
        world.spawn(RobotRole::Carrier, Team::B, 13);
        world.spawn(RobotRole::Carrier, Team::B, 14);
        world.spawn(RobotRole::Carrier, Team::A, 13);
        assert_eq!(world.destabilize(d, 13).unwrap(), 2);
    }

    #[test]
    fn test_nearby_sorted_by_distance() {
        let mut world = SimWorld::new(0);
        let me = world.spawn(RobotRole::Amplifier, Team::A, 10);
        let far = world.spawn(RobotRole::Carrier, Team::B, 15);
        let near = world.spawn(RobotRole::Carrier, Team::B, 8);
        world.spawn(RobotRole::Carrier, Team::B, 40);
        let ids: Vec<_> = world.nearby(me, SENSE_RADIUS).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![near, far]);
    }
}
