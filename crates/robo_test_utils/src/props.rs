//! Property-based testing strategies.

use proptest::prelude::*;
use robo_core::fault::ActionErrorKind;
use robo_core::role::RobotRole;
use robo_core::team::Team;

use crate::strategies::Step;

/// Any action rejection class.
pub fn arb_action_kind() -> impl Strategy<Value = ActionErrorKind> {
    prop_oneof![
        Just(ActionErrorKind::CantDoThat),
        Just(ActionErrorKind::CantMoveThere),
        Just(ActionErrorKind::CantSenseThat),
        Just(ActionErrorKind::NotReady),
        Just(ActionErrorKind::NotEnoughResource),
        Just(ActionErrorKind::OutOfRange),
        Just(ActionErrorKind::InvalidTarget),
    ]
}

/// Any step that returns control to the scheduler (no overrun).
pub fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Succeed),
        2 => arb_action_kind().prop_map(Step::ActionFault),
        1 => Just(Step::RuntimeFault),
        1 => Just(Step::Panic),
    ]
}

/// Any role.
pub fn arb_role() -> impl Strategy<Value = RobotRole> {
    proptest::sample::select(RobotRole::ALL.to_vec())
}

/// Either team.
pub fn arb_team() -> impl Strategy<Value = Team> {
    prop_oneof![Just(Team::A), Just(Team::B)]
}
