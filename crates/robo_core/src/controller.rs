//! The capability handle a host supplies to each robot.
//!
//! Every game effect flows through a [`RobotController`]. The scheduler only
//! uses the identity queries, the indicator string, `resign` and
//! `yield_turn`; concrete controller types add whatever world queries and
//! actions their strategies need.
//!
//! The host creates one controller per robot and keeps it for the robot's
//! whole life. The scheduler borrows it for the duration of a single call
//! and never stores it.

use crate::role::RobotRole;
use crate::team::Team;

/// Host-assigned robot identifier.
pub type RobotId = u32;

/// Trait defining what the scheduler needs from a robot's capability handle.
///
/// # Compute budget
///
/// Hosts meter every call against a per-round ceiling. A host that decides
/// the ceiling has been exceeded ends the robot by unwinding with
/// [`crate::fault::HostTermination`]; the scheduler never catches that.
pub trait RobotController {
    /// Host-assigned identifier of this robot.
    fn id(&self) -> RobotId;

    /// The robot's role.
    fn role(&self) -> RobotRole;

    /// The robot's team.
    fn team(&self) -> Team;

    /// The host's current round number.
    fn round_num(&self) -> u32;

    /// Attach a short debug note to this robot (shown in replays).
    fn set_indicator_string(&mut self, text: &str);

    /// Give up. What this means is up to the host.
    fn resign(&mut self);

    /// End this robot's turn, returning the unused budget to the host.
    ///
    /// Called exactly once per turn by the scheduler.
    fn yield_turn(&mut self);

    /// Compute left in the current round, if the host exposes it.
    fn budget_remaining(&self) -> Option<u32> {
        None
    }
}

impl<T: RobotController + ?Sized> RobotController for &mut T {
    fn id(&self) -> RobotId {
        (**self).id()
    }

    fn role(&self) -> RobotRole {
        (**self).role()
    }

    fn team(&self) -> Team {
        (**self).team()
    }

    fn round_num(&self) -> u32 {
        (**self).round_num()
    }

    fn set_indicator_string(&mut self, text: &str) {
        (**self).set_indicator_string(text);
    }

    fn resign(&mut self) {
        (**self).resign();
    }

    fn yield_turn(&mut self) {
        (**self).yield_turn();
    }

    fn budget_remaining(&self) -> Option<u32> {
        (**self).budget_remaining()
    }
}
