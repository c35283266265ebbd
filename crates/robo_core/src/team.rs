//! Team identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One side of a two-team match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    /// First team.
    A,
    /// Second team.
    B,
}

impl Team {
    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Dense index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_complement() {
        assert_eq!(Team::A.opponent(), Team::B);
        assert_eq!(Team::B.opponent(), Team::A);
    }

    #[test]
    fn test_opponent_is_involution() {
        for team in [Team::A, Team::B] {
            assert_eq!(team.opponent().opponent(), team);
            assert_ne!(team.opponent(), team);
        }
    }
}
