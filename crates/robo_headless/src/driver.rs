//! Host tick driver.
//!
//! Owns the world and one [`TurnScheduler`] per live robot. Each round it
//! starts schedulers for newly spawned robots, resumes every live robot once
//! in ID order, removes robots that were killed, resigned or destroyed, and
//! advances the world clock.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use robo_core::config::SchedulerConfig;
use robo_core::controller::{RobotController, RobotId};
use robo_core::diagnostics::TracingSink;
use robo_core::fault::HostTermination;
use robo_core::scheduler::{TurnReport, TurnScheduler};
use robo_core::session::AgentSession;
use robo_core::team::Team;
use tracing::{debug, info, warn};

use crate::controller::SimController;
use crate::metrics::{MatchMetrics, TerminationRecord};
use crate::scenario::Scenario;
use crate::strategies::{demo_registry, SabotageRule};
use crate::world::SimWorld;

struct Agent {
    controller: SimController,
    scheduler: TurnScheduler<SimController>,
}

/// Drives a scenario round by round.
pub struct HostDriver {
    world: Rc<RefCell<SimWorld>>,
    agents: BTreeMap<RobotId, Agent>,
    compute_ceiling: u32,
    round_limit: u32,
    sabotage: Vec<SabotageRule>,
    config: SchedulerConfig,
    metrics: MatchMetrics,
}

impl std::fmt::Debug for HostDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostDriver")
            .field("round", &self.round())
            .field("agents", &self.agents.len())
            .field("compute_ceiling", &self.compute_ceiling)
            .field("round_limit", &self.round_limit)
            .finish_non_exhaustive()
    }
}

impl HostDriver {
    /// Set up the world from a scenario. No robot runs until [`HostDriver::step`].
    #[must_use]
    pub fn new(scenario: &Scenario) -> Self {
        let mut world = SimWorld::new(scenario.starting_resources);
        for placement in &scenario.robots {
            world.spawn(placement.role, placement.team, placement.position);
        }
        Self {
            world: Rc::new(RefCell::new(world)),
            agents: BTreeMap::new(),
            compute_ceiling: scenario.compute_ceiling,
            round_limit: scenario.rounds,
            sabotage: scenario.sabotage.clone(),
            config: scenario.scheduler.clone(),
            metrics: MatchMetrics::new(scenario.name.clone(), scenario.compute_ceiling),
        }
    }

    /// Current world round.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.world.borrow().round()
    }

    /// Read-only view of the world.
    #[must_use]
    pub fn world(&self) -> Ref<'_, SimWorld> {
        self.world.borrow()
    }

    /// Metrics gathered so far.
    #[must_use]
    pub const fn metrics(&self) -> &MatchMetrics {
        &self.metrics
    }

    /// Number of robots with a running scheduler.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// A live robot's session.
    #[must_use]
    pub fn session(&self, id: RobotId) -> Option<&AgentSession> {
        self.agents.get(&id).map(|agent| agent.scheduler.session())
    }

    /// Whether one side has been wiped out.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        let world = self.world.borrow();
        world.count(Team::A) == 0 || world.count(Team::B) == 0
    }

    /// Play one round.
    ///
    /// Returns the reports of every turn that ran to completion.
    pub fn step(&mut self) -> Vec<TurnReport> {
        self.start_pending();

        let mut reports = Vec::with_capacity(self.agents.len());
        let ids: Vec<RobotId> = self.agents.keys().copied().collect();
        for id in ids {
            if !self.world.borrow().is_alive(id) {
                continue;
            }
            if let Some(report) = self.resume(id) {
                self.metrics.record_turn(&report);
                reports.push(report);
            }
            self.retire_if_resigned(id);
        }

        self.sweep_destroyed();
        self.world.borrow_mut().advance_round();
        self.metrics.rounds_played += 1;
        reports
    }

    /// Play until the round limit or until one side is wiped out.
    pub fn run(mut self) -> MatchMetrics {
        info!(
            scenario = %self.metrics.scenario,
            rounds = self.round_limit,
            ceiling = self.compute_ceiling,
            "match starting"
        );
        while self.metrics.rounds_played < self.round_limit && !self.is_decided() {
            self.step();
        }
        let (a, b) = {
            let world = self.world.borrow();
            (world.count(Team::A), world.count(Team::B))
        };
        let played = self.metrics.rounds_played;
        self.metrics.finalize(played, a, b);
        info!(
            rounds = played,
            winner = self.metrics.winner.as_deref().unwrap_or("none"),
            "match finished"
        );
        self.metrics
    }

    fn start_pending(&mut self) {
        let spawned = self.world.borrow_mut().take_spawns();
        for id in spawned {
            let Some(mut controller) = SimController::new(Rc::clone(&self.world), id, self.compute_ceiling)
            else {
                continue;
            };
            let scheduler = TurnScheduler::start(
                &mut controller,
                demo_registry(&self.sabotage),
                TracingSink,
                self.config.clone(),
            );
            self.agents.insert(id, Agent { controller, scheduler });
        }
    }

    fn resume(&mut self, id: RobotId) -> Option<TurnReport> {
        let agent = self.agents.get_mut(&id)?;
        agent.controller.begin_round();
        let yields_before = agent.controller.yields();

        let turn = panic::catch_unwind(AssertUnwindSafe(|| {
            agent.scheduler.run_turn(&mut agent.controller)
        }));
        match turn {
            Ok(report) => {
                if agent.controller.yields() != yields_before + 1 {
                    warn!(robot = id, turn = report.turn, "turn did not yield exactly once");
                    self.metrics.yield_violations += 1;
                }
                Some(report)
            }
            Err(payload) => match HostTermination::from_payload(payload) {
                Ok(termination) => {
                    self.terminate(id, termination);
                    None
                }
                Err(other) => panic::resume_unwind(other),
            },
        }
    }

    fn terminate(&mut self, id: RobotId, termination: HostTermination) {
        let Some(agent) = self.agents.remove(&id) else {
            return;
        };
        self.world.borrow_mut().remove(id);
        warn!(
            robot = id,
            role = %agent.controller.role(),
            round = termination.round,
            reason = %termination.reason,
            "robot terminated by host"
        );
        self.metrics.terminations.push(TerminationRecord {
            robot: id,
            role: agent.controller.role(),
            team: agent.controller.team(),
            round: termination.round,
            reason: termination.reason,
        });
    }

    fn retire_if_resigned(&mut self, id: RobotId) {
        let resigned = self.world.borrow().robot(id).is_some_and(|r| r.resigned);
        if resigned {
            self.world.borrow_mut().remove(id);
            self.agents.remove(&id);
            self.metrics.resignations += 1;
            debug!(robot = id, "robot resigned");
        }
    }

    fn sweep_destroyed(&mut self) {
        let world = self.world.borrow();
        let before = self.agents.len();
        self.agents.retain(|id, _| world.is_alive(*id));
        let destroyed = before - self.agents.len();
        drop(world);
        if destroyed > 0 {
            self.metrics.destroyed += u32::try_from(destroyed).unwrap_or(u32::MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use robo_core::role::RobotRole;

    use super::*;
    use crate::scenario::RobotPlacement;
    use crate::strategies::SabotageMode;

    fn lone(role: RobotRole, sabotage: Vec<SabotageRule>) -> Scenario {
        Scenario {
            name: "lone".to_string(),
            description: String::new(),
            rounds: 20,
            compute_ceiling: 2_000,
            starting_resources: 0,
            robots: vec![
                RobotPlacement::new(Team::A, RobotRole::Headquarters, 2),
                RobotPlacement::new(Team::A, role, 10),
                RobotPlacement::new(Team::B, RobotRole::Headquarters, 57),
            ],
            sabotage,
            scheduler: SchedulerConfig::default(),
        }
    }

    #[test]
    fn test_first_step_starts_everyone() {
        let mut driver = HostDriver::new(&lone(RobotRole::Carrier, Vec::new()));
        assert_eq!(driver.agent_count(), 0);
        let reports = driver.step();
        assert_eq!(driver.agent_count(), 3);
        assert_eq!(reports.len(), 3);
        assert_eq!(driver.round(), 1);
        assert_eq!(driver.world().robot(2).unwrap().indicator, "Hello world!");
    }

    #[test]
    fn test_turn_count_tracks_rounds() {
        let mut driver = HostDriver::new(&lone(RobotRole::Amplifier, Vec::new()));
        for _ in 0..7 {
            driver.step();
        }
        let session = driver.session(2).unwrap();
        assert_eq!(session.creation_round(), 0);
        assert_eq!(session.turn_count(), 7);
        assert_eq!(driver.metrics().yield_violations, 0);
    }

    #[test]
    fn test_overrun_is_terminated_and_removed() {
        let rules = vec![SabotageRule {
            role: RobotRole::Booster,
            mode: SabotageMode::Overrun,
            every: 3,
        }];
        let mut driver = HostDriver::new(&lone(RobotRole::Booster, rules));
        for _ in 0..5 {
            driver.step();
        }
        assert!(driver.session(2).is_none());
        assert!(!driver.world().is_alive(2));
        let terminations = &driver.metrics().terminations;
        assert_eq!(terminations.len(), 1);
        assert_eq!(terminations[0].round, 2);
        assert_eq!(terminations[0].role, RobotRole::Booster);
        let booster = driver.metrics().role(RobotRole::Booster).unwrap();
        assert_eq!(booster.turns, 2);
        assert_eq!(booster.diagnostics, 0);
    }

    #[test]
    fn test_panics_do_not_stop_the_match() {
        let rules = vec![SabotageRule {
            role: RobotRole::Launcher,
            mode: SabotageMode::Panic,
            every: 1,
        }];
        let mut driver = HostDriver::new(&lone(RobotRole::Launcher, rules));
        for _ in 0..10 {
            driver.step();
        }
        let launcher = driver.metrics().role(RobotRole::Launcher).unwrap();
        assert_eq!(launcher.turns, 10);
        assert_eq!(launcher.runtime_faults, 10);
        assert_eq!(launcher.diagnostics, 10);
        assert_eq!(driver.session(2).unwrap().turn_count(), 10);
    }
}
