//! Faults raised by strategies during a turn.
//!
//! Two tiers exist:
//! - [`StrategyFault::Action`]: the host rejected a world action
//! - [`StrategyFault::Runtime`]: anything else that went wrong in role logic,
//!   including panics
//!
//! Both are caught at the turn boundary. [`HostTermination`] is not a fault:
//! it is how a host kills a robot mid-turn, and it passes straight through.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the host rejected an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionErrorKind {
    /// The action is not legal for this robot right now.
    CantDoThat,
    /// Destination is blocked or off the map.
    CantMoveThere,
    /// Target is outside sensor range.
    CantSenseThat,
    /// Action or movement cooldown has not expired.
    NotReady,
    /// Team cannot afford it.
    NotEnoughResource,
    /// Target is outside action range.
    OutOfRange,
    /// Target does not exist or is not a valid target.
    InvalidTarget,
}

impl ActionErrorKind {
    /// Short machine-friendly name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CantDoThat => "cant_do_that",
            Self::CantMoveThere => "cant_move_there",
            Self::CantSenseThat => "cant_sense_that",
            Self::NotReady => "not_ready",
            Self::NotEnoughResource => "not_enough_resource",
            Self::OutOfRange => "out_of_range",
            Self::InvalidTarget => "invalid_target",
        }
    }
}

impl fmt::Display for ActionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A world action rejected by host-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ActionError {
    /// Rejection class.
    pub kind: ActionErrorKind,
    /// Host-supplied detail.
    pub message: String,
}

impl ActionError {
    /// Create a new action error.
    #[must_use]
    pub fn new(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Which catch tier a fault belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultTier {
    /// Rejected world action.
    Action,
    /// Any other failure in role logic.
    Runtime,
}

/// A fault raised by a strategy invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyFault {
    /// The host rejected an action.
    #[error("action rejected: {0}")]
    Action(#[from] ActionError),

    /// Role logic failed on its own.
    #[error("runtime fault: {0}")]
    Runtime(String),
}

impl StrategyFault {
    /// Build a runtime fault.
    #[must_use]
    pub fn runtime(detail: impl Into<String>) -> Self {
        Self::Runtime(detail.into())
    }

    /// The catch tier for this fault.
    #[must_use]
    pub const fn tier(&self) -> FaultTier {
        match self {
            Self::Action(_) => FaultTier::Action,
            Self::Runtime(_) => FaultTier::Runtime,
        }
    }
}

/// What happened during one turn.
///
/// Produced by the scheduler, handed to the diagnostic step and the host,
/// never stored by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The strategy ran to completion.
    Completed,
    /// Nothing ran: no strategy for the role, or the turn was skipped.
    Idle,
    /// The strategy raised a fault.
    Faulted(StrategyFault),
}

impl TurnOutcome {
    /// The fault, if any.
    #[must_use]
    pub const fn fault(&self) -> Option<&StrategyFault> {
        match self {
            Self::Faulted(fault) => Some(fault),
            _ => None,
        }
    }

    /// Whether the turn faulted.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }
}

impl From<Result<(), StrategyFault>> for TurnOutcome {
    fn from(result: Result<(), StrategyFault>) -> Self {
        match result {
            Ok(()) => Self::Completed,
            Err(fault) => Self::Faulted(fault),
        }
    }
}

/// Unwind payload a host uses to kill a robot mid-turn.
///
/// Raised with [`HostTermination::raise`] from inside a controller call.
/// Catch boundaries in this crate re-raise it untouched, so the turn ends
/// with no diagnostic, no yield and no counter increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTermination {
    /// Round the robot was killed in.
    pub round: u32,
    /// Host-supplied reason.
    pub reason: String,
}

impl HostTermination {
    /// Create a termination signal.
    #[must_use]
    pub fn new(round: u32, reason: impl Into<String>) -> Self {
        Self {
            round,
            reason: reason.into(),
        }
    }

    /// Unwind out of the current turn.
    pub fn raise(self) -> ! {
        panic::resume_unwind(Box::new(self))
    }

    /// Recover a termination from a caught unwind payload.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>> {
        payload.downcast::<Self>().map(|boxed| *boxed)
    }
}

/// Run `f`, turning a panic into its message.
///
/// A [`HostTermination`] payload is re-raised instead of caught.
pub(crate) fn absorb_panic<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            if (*payload).is::<HostTermination>() {
                panic::resume_unwind(payload);
            }
            Err(panic_message(&*payload))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> Result<(), ActionError> {
        Err(ActionError::new(ActionErrorKind::OutOfRange, "target 7 at distance 9"))
    }

    fn strategy_body() -> Result<(), StrategyFault> {
        rejected()?;
        Ok(())
    }

    #[test]
    fn test_action_error_converts_with_question_mark() {
        let fault = strategy_body().unwrap_err();
        assert_eq!(fault.tier(), FaultTier::Action);
        assert_eq!(
            fault.to_string(),
            "action rejected: out_of_range: target 7 at distance 9"
        );
    }

    #[test]
    fn test_runtime_fault_tier() {
        let fault = StrategyFault::runtime("index out of bounds");
        assert_eq!(fault.tier(), FaultTier::Runtime);
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(TurnOutcome::from(Ok(())), TurnOutcome::Completed);
        let outcome = TurnOutcome::from(Err(StrategyFault::runtime("x")));
        assert!(outcome.is_fault());
        assert!(TurnOutcome::Idle.fault().is_none());
    }

    #[test]
    fn test_absorb_panic_captures_message() {
        let result: Result<(), String> = absorb_panic(|| panic!("bad index {}", 3));
        assert_eq!(result.unwrap_err(), "bad index 3");

        let result: Result<(), String> = absorb_panic(|| panic!("static message"));
        assert_eq!(result.unwrap_err(), "static message");
    }

    #[test]
    fn test_absorb_panic_passes_value_through() {
        assert_eq!(absorb_panic(|| 42), Ok(42));
    }

    #[test]
    fn test_absorb_panic_reraises_host_termination() {
        let outer = panic::catch_unwind(|| {
            let _ = absorb_panic(|| HostTermination::new(12, "over budget").raise());
        });
        let payload = outer.unwrap_err();
        let termination = HostTermination::from_payload(payload).unwrap();
        assert_eq!(termination, HostTermination::new(12, "over budget"));
    }
}
