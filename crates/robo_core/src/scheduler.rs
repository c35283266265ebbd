//! The per-robot turn scheduler.
//!
//! A host calls [`TurnScheduler::start`] once when a robot is first resumed,
//! then [`TurnScheduler::run_turn`] once per round for as long as the robot
//! lives. Returning from `run_turn` is the end of the turn.
//!
//! # Turn Order
//!
//! Each turn runs these steps, in order:
//! 1. **Role** - read the role from the controller (once)
//! 2. **Drift check** - optional, see [`DriftPolicy`]
//! 3. **Dispatch** - run the registered strategy inside the failure boundary
//! 4. **Diagnostics** - one record if the strategy faulted
//! 5. **Yield** - hand the rest of the budget back to the host
//! 6. **Advance** - bump the session's turn counter
//!
//! Steps 5 and 6 happen whatever steps 3 and 4 did. The only exit that
//! skips them is a [`HostTermination`](crate::fault::HostTermination)
//! unwind, which means the host has already killed the robot.
//!
//! # Example
//!
//! ```
//! use robo_core::prelude::*;
//!
//! struct Bot { round: u32, yields: u32 }
//!
//! impl RobotController for Bot {
//!     fn id(&self) -> RobotId { 1 }
//!     fn role(&self) -> RobotRole { RobotRole::Carrier }
//!     fn team(&self) -> Team { Team::A }
//!     fn round_num(&self) -> u32 { self.round }
//!     fn set_indicator_string(&mut self, _text: &str) {}
//!     fn resign(&mut self) {}
//!     fn yield_turn(&mut self) { self.yields += 1; }
//! }
//!
//! let registry = StrategyRegistry::<Bot>::builder()
//!     .with(RobotRole::Carrier, |_rc: &mut Bot| -> std::result::Result<(), StrategyFault> {
//!         Err(StrategyFault::runtime("oops"))
//!     })
//!     .unwrap()
//!     .build();
//!
//! let mut bot = Bot { round: 3, yields: 0 };
//! let mut scheduler =
//!     TurnScheduler::start(&mut bot, registry, Vec::<DiagnosticRecord>::new(), SchedulerConfig::default());
//!
//! let report = scheduler.run_turn(&mut bot);
//! assert!(report.outcome.is_fault());
//! assert_eq!(bot.yields, 1);
//! assert_eq!(scheduler.session().turn_count(), 1);
//! assert_eq!(scheduler.sink().len(), 1);
//! ```

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::config::{DriftPolicy, SchedulerConfig};
use crate::controller::RobotController;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::fault::{absorb_panic, StrategyFault, TurnOutcome};
use crate::registry::StrategyRegistry;
use crate::role::RobotRole;
use crate::session::AgentSession;

/// What one call to [`TurnScheduler::run_turn`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Zero-based index of this turn in the robot's life.
    pub turn: u32,
    /// Host round the turn ran in.
    pub round: u32,
    /// Role read at the start of the turn.
    pub role: RobotRole,
    /// Strategy result.
    pub outcome: TurnOutcome,
    /// Whether the sink accepted a diagnostic record.
    pub diagnostic_emitted: bool,
    /// Expected turn count when the drift check fired.
    pub drift: Option<u32>,
}

/// Drives one robot's turns.
pub struct TurnScheduler<C: RobotController + ?Sized, S: DiagnosticSink = TracingSink> {
    session: AgentSession,
    registry: StrategyRegistry<C>,
    sink: S,
    config: SchedulerConfig,
}

impl<C: RobotController + ?Sized, S: DiagnosticSink> TurnScheduler<C, S> {
    /// Set up a robot's session on its first invocation.
    ///
    /// Records team, opponent and the current round as the creation round,
    /// and sets the configured greeting as the indicator string.
    pub fn start(rc: &mut C, registry: StrategyRegistry<C>, sink: S, config: SchedulerConfig) -> Self {
        let session = AgentSession::new(rc.role(), rc.team(), rc.round_num());
        if let Some(greeting) = config.greeting.as_deref() {
            rc.set_indicator_string(greeting);
        }
        debug!(
            robot = rc.id(),
            role = %session.role(),
            team = %session.team(),
            round = session.creation_round(),
            "session started"
        );
        Self {
            session,
            registry,
            sink,
            config,
        }
    }

    /// Run one turn and yield.
    pub fn run_turn(&mut self, rc: &mut C) -> TurnReport {
        let turn = self.session.turn_count();
        let mut guard = TurnGuard::new(rc);
        let round = guard.round_num();
        let role = guard.role();
        if role != self.session.role() {
            warn!(
                robot = guard.id(),
                expected = %self.session.role(),
                actual = %role,
                "role changed since startup"
            );
        }

        let drift = self.check_drift(&mut guard, round);
        let outcome = if drift.is_some() && self.config.drift_policy == DriftPolicy::Resign {
            TurnOutcome::Idle
        } else {
            self.dispatch(role, &mut guard)
        };

        let diagnostic_emitted = match outcome.fault() {
            Some(fault) => self.report(role, fault),
            None => false,
        };

        drop(guard);
        self.session.complete_turn();

        TurnReport {
            turn,
            round,
            role,
            outcome,
            diagnostic_emitted,
            drift,
        }
    }

    fn check_drift(&self, rc: &mut C, round: u32) -> Option<u32> {
        if self.config.drift_policy == DriftPolicy::Off {
            return None;
        }
        let expected = self.session.drift(round)?;
        warn!(
            robot = rc.id(),
            role = %self.session.role(),
            turn_count = self.session.turn_count(),
            expected,
            "turn count out of sync with round number"
        );
        if self.config.drift_policy == DriftPolicy::Resign {
            rc.resign();
        }
        Some(expected)
    }

    fn dispatch(&mut self, role: RobotRole, rc: &mut C) -> TurnOutcome {
        let Some(strategy) = self.registry.get_mut(role) else {
            return TurnOutcome::Idle;
        };
        let result = match absorb_panic(|| strategy.run(rc)) {
            Ok(result) => result,
            Err(message) => Err(StrategyFault::Runtime(format!("panicked: {message}"))),
        };
        if result.is_ok() && self.config.report_budget {
            debug!(role = %role, budget = ?rc.budget_remaining(), "compute left");
        }
        TurnOutcome::from(result)
    }

    fn report(&mut self, role: RobotRole, fault: &StrategyFault) -> bool {
        let detail = fault.to_string();
        let sink = &mut self.sink;
        match absorb_panic(|| sink.emit(role.label(), &detail)) {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(role = %role, error = %err, "diagnostic sink rejected record");
                false
            }
            Err(message) => {
                warn!(role = %role, panic = %message, "diagnostic sink panicked");
                false
            }
        }
    }

    /// Session counters.
    #[must_use]
    pub const fn session(&self) -> &AgentSession {
        &self.session
    }

    /// Dispatch table.
    #[must_use]
    pub const fn registry(&self) -> &StrategyRegistry<C> {
        &self.registry
    }

    /// Diagnostic sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Diagnostic sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

/// Yields the controller when dropped.
///
/// Skips the yield while unwinding, which only happens for a
/// [`crate::fault::HostTermination`]: every other panic is caught inside
/// the turn.
struct TurnGuard<'a, C: RobotController + ?Sized> {
    rc: &'a mut C,
}

impl<'a, C: RobotController + ?Sized> TurnGuard<'a, C> {
    fn new(rc: &'a mut C) -> Self {
        Self { rc }
    }
}

impl<C: RobotController + ?Sized> Deref for TurnGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.rc
    }
}

impl<C: RobotController + ?Sized> DerefMut for TurnGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.rc
    }
}

impl<C: RobotController + ?Sized> Drop for TurnGuard<'_, C> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.rc.yield_turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::RobotId;
    use crate::diagnostics::DiagnosticRecord;
    use crate::fault::{ActionError, ActionErrorKind, FaultTier, HostTermination};
    use crate::team::Team;

    #[derive(Default)]
    struct Probe {
        round: u32,
        yields: u32,
        resigns: u32,
        indicator: String,
    }

    impl RobotController for Probe {
        fn id(&self) -> RobotId {
            7
        }
        fn role(&self) -> RobotRole {
            RobotRole::Launcher
        }
        fn team(&self) -> Team {
            Team::B
        }
        fn round_num(&self) -> u32 {
            self.round
        }
        fn set_indicator_string(&mut self, text: &str) {
            self.indicator = text.to_string();
        }
        fn resign(&mut self) {
            self.resigns += 1;
        }
        fn yield_turn(&mut self) {
            self.yields += 1;
        }
    }

    type Scheduler = TurnScheduler<Probe, Vec<DiagnosticRecord>>;

    fn scheduler_with<F>(rc: &mut Probe, config: SchedulerConfig, strategy: F) -> Scheduler
    where
        F: FnMut(&mut Probe) -> Result<(), StrategyFault> + 'static,
    {
        let registry = StrategyRegistry::builder()
            .with(RobotRole::Launcher, strategy)
            .unwrap()
            .build();
        TurnScheduler::start(rc, registry, Vec::new(), config)
    }

    #[test]
    fn test_start_records_identity_and_greeting() {
        let mut rc = Probe {
            round: 4,
            ..Default::default()
        };
        let scheduler = scheduler_with(&mut rc, SchedulerConfig::default(), |_| Ok(()));
        assert_eq!(scheduler.session().creation_round(), 4);
        assert_eq!(scheduler.session().team(), Team::B);
        assert_eq!(scheduler.session().opponent(), Team::A);
        assert_eq!(rc.indicator, "Hello world!");
        assert_eq!(rc.yields, 0);
    }

    #[test]
    fn test_action_fault_is_contained() {
        let mut rc = Probe::default();
        let mut scheduler = scheduler_with(&mut rc, SchedulerConfig::default(), |_| {
            Err(ActionError::new(ActionErrorKind::NotReady, "cooldown 3").into())
        });
        let report = scheduler.run_turn(&mut rc);
        assert_eq!(report.outcome.fault().map(StrategyFault::tier), Some(FaultTier::Action));
        assert!(report.diagnostic_emitted);
        assert_eq!(rc.yields, 1);
        assert_eq!(scheduler.sink()[0].role, "LAUNCHER");
    }

    #[test]
    fn test_panic_becomes_runtime_fault() {
        let mut rc = Probe::default();
        let mut scheduler = scheduler_with(&mut rc, SchedulerConfig::default(), |rc: &mut Probe| {
            let targets: Vec<u32> = Vec::new();
            rc.round = targets[3];
            Ok(())
        });
        let report = scheduler.run_turn(&mut rc);
        assert_eq!(report.outcome.fault().map(StrategyFault::tier), Some(FaultTier::Runtime));
        assert!(scheduler.sink()[0].detail.starts_with("runtime fault: panicked:"));
        assert_eq!(rc.yields, 1);
        assert_eq!(scheduler.session().turn_count(), 1);
    }

    #[test]
    fn test_unmapped_role_is_idle() {
        let mut rc = Probe::default();
        let registry = StrategyRegistry::<Probe>::builder().build();
        let mut scheduler: Scheduler =
            TurnScheduler::start(&mut rc, registry, Vec::new(), SchedulerConfig::default());
        let report = scheduler.run_turn(&mut rc);
        assert_eq!(report.outcome, TurnOutcome::Idle);
        assert!(!report.diagnostic_emitted);
        assert!(scheduler.sink().is_empty());
        assert_eq!(rc.yields, 1);
    }

    #[test]
    fn test_drift_resign_skips_strategy() {
        let mut rc = Probe::default();
        let config = SchedulerConfig {
            drift_policy: DriftPolicy::Resign,
            ..SchedulerConfig::default()
        };
        let mut scheduler = scheduler_with(&mut rc, config, |_| Err(StrategyFault::runtime("ran")));

        // In sync: strategy runs.
        let report = scheduler.run_turn(&mut rc);
        assert_eq!(report.drift, None);
        assert!(report.outcome.is_fault());

        // Skip two rounds.
        rc.round = 3;
        let report = scheduler.run_turn(&mut rc);
        assert_eq!(report.drift, Some(3));
        assert_eq!(report.outcome, TurnOutcome::Idle);
        assert_eq!(rc.resigns, 1);
        assert_eq!(rc.yields, 2);
        assert_eq!(scheduler.sink().len(), 1);
    }

    #[test]
    fn test_drift_off_ignores_desync() {
        let mut rc = Probe::default();
        let mut scheduler = scheduler_with(&mut rc, SchedulerConfig::default(), |_| Ok(()));
        rc.round = 100;
        let report = scheduler.run_turn(&mut rc);
        assert_eq!(report.drift, None);
        assert_eq!(report.outcome, TurnOutcome::Completed);
        assert_eq!(rc.resigns, 0);
    }

    #[test]
    fn test_host_termination_skips_yield_and_increment() {
        let mut rc = Probe::default();
        let mut scheduler = scheduler_with(&mut rc, SchedulerConfig::default(), |rc: &mut Probe| {
            HostTermination::new(rc.round, "over budget").raise()
        });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scheduler.run_turn(&mut rc);
        }));
        assert!(HostTermination::from_payload(result.unwrap_err()).is_ok());
        assert_eq!(rc.yields, 0);
        assert_eq!(scheduler.session().turn_count(), 0);
        assert!(scheduler.sink().is_empty());
    }
}
