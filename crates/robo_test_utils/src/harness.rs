//! Round-driving harness.
//!
//! Plays the host tick driver for a single robot: resume, run one turn,
//! advance the round, repeat. Catches the host's own termination signal the
//! way a real host would, so tests can assert on what happened before it.

use std::panic::{self, AssertUnwindSafe};

use robo_core::diagnostics::DiagnosticSink;
use robo_core::fault::HostTermination;
use robo_core::scheduler::{TurnReport, TurnScheduler};
use tracing::debug;

use crate::controller::ScriptedController;

/// What happened over a run of rounds.
#[derive(Debug, Clone, Default)]
pub struct RoundsResult {
    /// One report per completed turn.
    pub reports: Vec<TurnReport>,
    /// Set if the host killed the robot.
    pub terminated: Option<HostTermination>,
}

impl RoundsResult {
    /// Number of reports with a fault.
    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_fault()).count()
    }

    /// Number of reports whose diagnostic reached the sink.
    #[must_use]
    pub fn diagnostic_count(&self) -> usize {
        self.reports.iter().filter(|r| r.diagnostic_emitted).count()
    }
}

/// Run up to `rounds` turns, stopping early if the host kills the robot.
///
/// # Panics
///
/// Re-raises any unwind that is not a [`HostTermination`]; the scheduler
/// should never let one out.
pub fn run_rounds<S: DiagnosticSink>(
    scheduler: &mut TurnScheduler<ScriptedController, S>,
    rc: &mut ScriptedController,
    rounds: u32,
) -> RoundsResult {
    let mut result = RoundsResult::default();
    for _ in 0..rounds {
        let turn = panic::catch_unwind(AssertUnwindSafe(|| scheduler.run_turn(rc)));
        match turn {
            Ok(report) => result.reports.push(report),
            Err(payload) => match HostTermination::from_payload(payload) {
                Ok(termination) => {
                    debug!(round = termination.round, reason = %termination.reason, "robot terminated");
                    result.terminated = Some(termination);
                    return result;
                }
                Err(other) => panic::resume_unwind(other),
            },
        }
        rc.next_round();
    }
    result
}
