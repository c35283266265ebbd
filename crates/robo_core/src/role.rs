//! Robot roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed behavioral category of a robot.
///
/// The set is closed: every robot has exactly one role for its whole life,
/// and the strategy registry is indexed by [`RobotRole::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RobotRole {
    /// Stationary base. Produces other robots.
    Headquarters,
    /// Gathers resources and ferries them home.
    Carrier,
    /// Primary combat unit.
    Launcher,
    /// Area support that speeds up nearby allies.
    Booster,
    /// Area damage against enemy clusters.
    Destabilizer,
    /// Extends allied sensing and communication.
    Amplifier,
}

impl RobotRole {
    /// Number of roles.
    pub const COUNT: usize = 6;

    /// Every role, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Headquarters,
        Self::Carrier,
        Self::Launcher,
        Self::Booster,
        Self::Destabilizer,
        Self::Amplifier,
    ];

    /// Dense index in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Headquarters => 0,
            Self::Carrier => 1,
            Self::Launcher => 2,
            Self::Booster => 3,
            Self::Destabilizer => 4,
            Self::Amplifier => 5,
        }
    }

    /// Upper-case label used in diagnostic records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Headquarters => "HEADQUARTERS",
            Self::Carrier => "CARRIER",
            Self::Launcher => "LAUNCHER",
            Self::Booster => "BOOSTER",
            Self::Destabilizer => "DESTABILIZER",
            Self::Amplifier => "AMPLIFIER",
        }
    }

    /// Whether this role is a building (cannot move).
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(self, Self::Headquarters)
    }
}

impl fmt::Display for RobotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, role) in RobotRole::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<_> = RobotRole::ALL.iter().map(|r| r.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), RobotRole::COUNT);
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(RobotRole::Launcher.to_string(), "LAUNCHER");
    }

    #[test]
    fn test_only_headquarters_is_building() {
        assert!(RobotRole::Headquarters.is_building());
        assert!(!RobotRole::Carrier.is_building());
    }
}
