//! Scripted strategies.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use robo_core::fault::{ActionError, ActionErrorKind, StrategyFault};
use robo_core::registry::Strategy;

use crate::controller::ScriptedController;

/// Compute charged per iteration by [`Step::Overrun`].
pub const OVERRUN_CHUNK: u32 = 500;

/// What a scripted strategy does on one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Return `Ok`.
    Succeed,
    /// Return an action fault of this kind.
    ActionFault(ActionErrorKind),
    /// Return a runtime fault.
    RuntimeFault,
    /// Panic.
    Panic,
    /// Spend compute until the host kills the robot.
    Overrun,
}

impl Step {
    /// Whether the scheduler should report this step as a fault.
    #[must_use]
    pub const fn is_fault(self) -> bool {
        matches!(self, Self::ActionFault(_) | Self::RuntimeFault | Self::Panic)
    }
}

/// Shared record of which strategies ran, in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<&'static str>>>);

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn record(&self, tag: &'static str) {
        self.0.borrow_mut().push(tag);
    }
}

/// Strategy that replays a script, then repeats a fallback step forever.
#[derive(Debug)]
pub struct ScriptedStrategy {
    tag: &'static str,
    script: VecDeque<Step>,
    fallback: Step,
    log: CallLog,
}

impl ScriptedStrategy {
    /// A strategy that does `step` on every call.
    #[must_use]
    pub fn always(tag: &'static str, step: Step, log: &CallLog) -> Self {
        Self::scripted(tag, Vec::new(), step, log)
    }

    /// A strategy that plays `script` in order, then `fallback` forever.
    #[must_use]
    pub fn scripted(tag: &'static str, script: Vec<Step>, fallback: Step, log: &CallLog) -> Self {
        Self {
            tag,
            script: script.into(),
            fallback,
            log: log.clone(),
        }
    }
}

impl Strategy<ScriptedController> for ScriptedStrategy {
    fn run(&mut self, rc: &mut ScriptedController) -> Result<(), StrategyFault> {
        self.log.record(self.tag);
        let step = self.script.pop_front().unwrap_or(self.fallback);
        match step {
            Step::Succeed => {
                rc.spend(1);
                Ok(())
            }
            Step::ActionFault(kind) => Err(ActionError::new(
                kind,
                format!("{} tried something illegal in round {}", self.tag, rc.round),
            )
            .into()),
            Step::RuntimeFault => Err(StrategyFault::runtime(format!(
                "{} lost track of its target",
                self.tag
            ))),
            Step::Panic => panic!("{} hit a bug", self.tag),
            Step::Overrun => loop {
                rc.spend(OVERRUN_CHUNK);
            },
        }
    }
}
