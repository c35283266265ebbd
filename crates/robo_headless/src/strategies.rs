//! Demo per-role strategies for the simulated world.
//!
//! These are intentionally simple. They exist to give the scheduler real
//! work, including the occasional legitimate action rejection. [`Sabotaged`]
//! wraps any of them to inject faults on a fixed cadence for chaos runs.

use std::collections::VecDeque;

use robo_core::controller::RobotController;
use robo_core::fault::{ActionError, ActionErrorKind, StrategyFault};
use robo_core::registry::{RoleRoster, Strategy, StrategyRegistry};
use robo_core::role::RobotRole;
use serde::{Deserialize, Serialize};

use crate::controller::SimController;
use crate::world::{build_cost, ACTION_RADIUS, CARGO_CAPACITY, MAP_WIDTH, SENSE_RADIUS, WELL_POSITION};

type TurnResult = Result<(), StrategyFault>;

/// Compute burned per iteration of an overrun loop.
const OVERRUN_CHUNK: u32 = 500;

fn step_toward(from: i32, to: i32) -> i32 {
    (to - from).signum()
}

fn not_found(what: &str) -> StrategyFault {
    StrategyFault::runtime(format!("{what} not found"))
}

/// Attacks anything in range, otherwise works through a build order.
#[derive(Debug, Clone)]
pub struct HeadquartersStrategy {
    build_order: VecDeque<RobotRole>,
}

impl Default for HeadquartersStrategy {
    fn default() -> Self {
        Self {
            build_order: VecDeque::from([
                RobotRole::Carrier,
                RobotRole::Launcher,
                RobotRole::Carrier,
                RobotRole::Amplifier,
                RobotRole::Launcher,
                RobotRole::Booster,
                RobotRole::Destabilizer,
            ]),
        }
    }
}

impl Strategy<SimController> for HeadquartersStrategy {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        let me = rc.me().ok_or_else(|| not_found("headquarters"))?;
        if me.action_cooldown > 0 {
            return Ok(());
        }
        if let Some(enemy) = rc.nearest_enemy(ACTION_RADIUS) {
            rc.attack(enemy.id)?;
            return Ok(());
        }
        let Some(next) = self.build_order.front().copied() else {
            return Ok(());
        };
        if build_cost(next).is_some_and(|cost| rc.team_resources() >= cost) {
            rc.build(next)?;
            self.build_order.rotate_left(1);
            rc.set_indicator_string(&format!("built {next}"));
        }
        Ok(())
    }
}

/// Shuttles between the well and home.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarrierStrategy;

impl Strategy<SimController> for CarrierStrategy {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        let me = rc.me().ok_or_else(|| not_found("carrier"))?;
        let home = rc.headquarters(me.team).ok_or_else(|| not_found("home base"))?;

        if me.cargo >= CARGO_CAPACITY || (me.cargo > 0 && (me.position - home).abs() <= ACTION_RADIUS) {
            if (me.position - home).abs() <= ACTION_RADIUS {
                if me.action_cooldown == 0 {
                    rc.deposit()?;
                }
            } else if me.move_cooldown == 0 {
                rc.move_by(step_toward(me.position, home))?;
            }
            return Ok(());
        }

        if (me.position - WELL_POSITION).abs() <= ACTION_RADIUS {
            if me.action_cooldown == 0 {
                rc.collect()?;
            }
        } else if me.move_cooldown == 0 {
            rc.move_by(step_toward(me.position, WELL_POSITION))?;
        }
        Ok(())
    }
}

/// Advances on the enemy base and shoots the nearest enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LauncherStrategy;

impl Strategy<SimController> for LauncherStrategy {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        let me = rc.me().ok_or_else(|| not_found("launcher"))?;
        if let Some(enemy) = rc.nearest_enemy(ACTION_RADIUS) {
            if me.action_cooldown == 0 {
                rc.attack(enemy.id)?;
            }
            return Ok(());
        }
        if me.move_cooldown == 0 {
            let target = rc
                .headquarters(me.team.opponent())
                .unwrap_or(if me.position < WELL_POSITION { MAP_WIDTH - 1 } else { 0 });
            let step = step_toward(me.position, target);
            if step != 0 {
                rc.move_by(step)?;
            }
        }
        Ok(())
    }
}

/// Holds the center and boosts allies around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoosterStrategy;

impl Strategy<SimController> for BoosterStrategy {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        let me = rc.me().ok_or_else(|| not_found("booster"))?;
        let allies = rc
            .sense(ACTION_RADIUS)
            .iter()
            .filter(|r| r.team == me.team)
            .count();
        if allies > 0 && me.action_cooldown == 0 {
            rc.boost()?;
        } else if me.move_cooldown == 0 && me.position != WELL_POSITION {
            rc.move_by(step_toward(me.position, WELL_POSITION))?;
        }
        Ok(())
    }
}

/// Waits near the center for an enemy to blast.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestabilizerStrategy;

impl Strategy<SimController> for DestabilizerStrategy {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        let me = rc.me().ok_or_else(|| not_found("destabilizer"))?;
        if me.action_cooldown == 0 {
            if let Some(enemy) = rc.nearest_enemy(ACTION_RADIUS) {
                rc.destabilize(enemy.position)?;
                return Ok(());
            }
        }
        if me.move_cooldown == 0 && me.position != WELL_POSITION {
            rc.move_by(step_toward(me.position, WELL_POSITION))?;
        }
        Ok(())
    }
}

/// Scouts the center and reports what it sees in its indicator string.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmplifierStrategy;

impl Strategy<SimController> for AmplifierStrategy {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        let me = rc.me().ok_or_else(|| not_found("amplifier"))?;
        let enemies = rc
            .sense(SENSE_RADIUS)
            .iter()
            .filter(|r| r.team != me.team)
            .count();
        rc.set_indicator_string(&format!("{enemies} enemies in view"));
        if me.move_cooldown == 0 && me.position != WELL_POSITION {
            rc.move_by(step_toward(me.position, WELL_POSITION))?;
        }
        Ok(())
    }
}

/// How a sabotaged strategy misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SabotageMode {
    /// Attempt a move the host rejects.
    IllegalAction,
    /// Return a runtime fault.
    RuntimeFault,
    /// Panic mid-turn.
    Panic,
    /// Burn compute until the host kills the robot.
    Overrun,
}

/// Inject `mode` into `role`'s strategy every `every` turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SabotageRule {
    /// Role to sabotage.
    pub role: RobotRole,
    /// Kind of misbehavior.
    pub mode: SabotageMode,
    /// Cadence in turns. `1` means every turn; `0` disables the rule.
    pub every: u32,
}

/// Wraps a strategy and misbehaves on a fixed cadence.
pub struct Sabotaged {
    inner: Box<dyn Strategy<SimController>>,
    mode: SabotageMode,
    every: u32,
    turns: u32,
}

impl Sabotaged {
    /// Wrap `inner`.
    pub fn new(inner: Box<dyn Strategy<SimController>>, mode: SabotageMode, every: u32) -> Self {
        Self {
            inner,
            mode,
            every,
            turns: 0,
        }
    }

    fn misbehave(&self, rc: &mut SimController) -> TurnResult {
        match self.mode {
            SabotageMode::IllegalAction => {
                rc.move_by(MAP_WIDTH * 2)?;
                Err(ActionError::new(ActionErrorKind::CantMoveThere, "move unexpectedly accepted").into())
            }
            SabotageMode::RuntimeFault => Err(StrategyFault::runtime(format!(
                "sabotaged {} on turn {}",
                rc.role(),
                self.turns
            ))),
            SabotageMode::Panic => panic!("sabotaged {} panicked on turn {}", rc.role(), self.turns),
            SabotageMode::Overrun => loop {
                rc.burn(OVERRUN_CHUNK);
            },
        }
    }
}

impl std::fmt::Debug for Sabotaged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sabotaged")
            .field("mode", &self.mode)
            .field("every", &self.every)
            .field("turns", &self.turns)
            .finish_non_exhaustive()
    }
}

impl Strategy<SimController> for Sabotaged {
    fn run(&mut self, rc: &mut SimController) -> TurnResult {
        self.turns += 1;
        if self.every > 0 && self.turns % self.every == 0 {
            return self.misbehave(rc);
        }
        self.inner.run(rc)
    }
}

fn armed(
    role: RobotRole,
    base: Box<dyn Strategy<SimController>>,
    rules: &[SabotageRule],
) -> Box<dyn Strategy<SimController>> {
    match rules.iter().find(|rule| rule.role == role && rule.every > 0) {
        Some(rule) => Box::new(Sabotaged::new(base, rule.mode, rule.every)),
        None => base,
    }
}

/// Registry with a demo strategy for every role, sabotaged per `rules`.
///
/// Only the first enabled rule per role is applied.
pub fn demo_registry(rules: &[SabotageRule]) -> StrategyRegistry<SimController> {
    StrategyRegistry::from_roster(RoleRoster {
        headquarters: armed(RobotRole::Headquarters, Box::new(HeadquartersStrategy::default()), rules),
        carrier: armed(RobotRole::Carrier, Box::new(CarrierStrategy), rules),
        launcher: armed(RobotRole::Launcher, Box::new(LauncherStrategy), rules),
        booster: armed(RobotRole::Booster, Box::new(BoosterStrategy), rules),
        destabilizer: armed(RobotRole::Destabilizer, Box::new(DestabilizerStrategy), rules),
        amplifier: armed(RobotRole::Amplifier, Box::new(AmplifierStrategy), rules),
    })
}
