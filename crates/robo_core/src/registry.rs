//! Role to strategy dispatch table.
//!
//! The role set is closed, so the table is a fixed array indexed by
//! [`RobotRole::index`]. It is built once and never changes afterwards.
//!
//! Two ways to build one:
//! - [`StrategyRegistry::from_roster`] takes a [`RoleRoster`] with one field
//!   per role, so a missing role is a compile error.
//! - [`StrategyRegistry::builder`] maps roles one at a time; unmapped roles
//!   become no-op turns.

use std::fmt;

use crate::controller::RobotController;
use crate::error::{Result, RoboError};
use crate::fault::StrategyFault;
use crate::role::RobotRole;

/// Role-specific turn logic.
///
/// # Contract
///
/// `run` gets the robot's controller for one turn. It may make any number of
/// queries and actions, may return a fault, and must return before the
/// host's compute ceiling is hit. It must not block or wait for a later
/// round; anything that has to survive until next turn lives in `self`.
pub trait Strategy<C: RobotController + ?Sized> {
    /// Play one turn.
    fn run(&mut self, rc: &mut C) -> std::result::Result<(), StrategyFault>;
}

impl<C, F> Strategy<C> for F
where
    C: RobotController + ?Sized,
    F: FnMut(&mut C) -> std::result::Result<(), StrategyFault>,
{
    fn run(&mut self, rc: &mut C) -> std::result::Result<(), StrategyFault> {
        self(rc)
    }
}

type Slot<C> = Option<Box<dyn Strategy<C>>>;

/// One strategy per role.
pub struct RoleRoster<C: RobotController + ?Sized> {
    /// Strategy for [`RobotRole::Headquarters`].
    pub headquarters: Box<dyn Strategy<C>>,
    /// Strategy for [`RobotRole::Carrier`].
    pub carrier: Box<dyn Strategy<C>>,
    /// Strategy for [`RobotRole::Launcher`].
    pub launcher: Box<dyn Strategy<C>>,
    /// Strategy for [`RobotRole::Booster`].
    pub booster: Box<dyn Strategy<C>>,
    /// Strategy for [`RobotRole::Destabilizer`].
    pub destabilizer: Box<dyn Strategy<C>>,
    /// Strategy for [`RobotRole::Amplifier`].
    pub amplifier: Box<dyn Strategy<C>>,
}

/// Fixed mapping from role to strategy.
pub struct StrategyRegistry<C: RobotController + ?Sized> {
    slots: [Slot<C>; RobotRole::COUNT],
}

impl<C: RobotController + ?Sized> StrategyRegistry<C> {
    /// Build a registry covering every role.
    #[must_use]
    pub fn from_roster(roster: RoleRoster<C>) -> Self {
        let RoleRoster {
            headquarters,
            carrier,
            launcher,
            booster,
            destabilizer,
            amplifier,
        } = roster;
        Self {
            slots: [
                Some(headquarters),
                Some(carrier),
                Some(launcher),
                Some(booster),
                Some(destabilizer),
                Some(amplifier),
            ],
        }
    }

    /// Start building a registry one role at a time.
    #[must_use]
    pub fn builder() -> RegistryBuilder<C> {
        RegistryBuilder {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Strategy for `role`, if one is mapped.
    pub fn get_mut(&mut self, role: RobotRole) -> Option<&mut (dyn Strategy<C> + 'static)> {
        self.slots[role.index()].as_deref_mut()
    }

    /// Whether `role` has a strategy.
    #[must_use]
    pub fn is_mapped(&self, role: RobotRole) -> bool {
        self.slots[role.index()].is_some()
    }

    /// Roles with a strategy, in index order.
    #[must_use]
    pub fn mapped_roles(&self) -> Vec<RobotRole> {
        RobotRole::ALL
            .into_iter()
            .filter(|role| self.is_mapped(*role))
            .collect()
    }

    /// Whether every role has a strategy.
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

impl<C: RobotController + ?Sized> fmt::Debug for StrategyRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("mapped", &self.mapped_roles())
            .finish()
    }
}

/// Builder for a possibly partial [`StrategyRegistry`].
pub struct RegistryBuilder<C: RobotController + ?Sized> {
    slots: [Slot<C>; RobotRole::COUNT],
}

impl<C: RobotController + ?Sized> RegistryBuilder<C> {
    /// Map `role` to `strategy`.
    ///
    /// # Errors
    /// Returns [`RoboError::DuplicateRole`] if `role` is already mapped.
    pub fn with<S>(self, role: RobotRole, strategy: S) -> Result<Self>
    where
        S: Strategy<C> + 'static,
    {
        self.with_boxed(role, Box::new(strategy))
    }

    /// Map `role` to an already boxed strategy.
    pub fn with_boxed(mut self, role: RobotRole, strategy: Box<dyn Strategy<C>>) -> Result<Self> {
        let slot = &mut self.slots[role.index()];
        if slot.is_some() {
            return Err(RoboError::DuplicateRole(role));
        }
        *slot = Some(strategy);
        Ok(self)
    }

    /// Freeze the mapping.
    #[must_use]
    pub fn build(self) -> StrategyRegistry<C> {
        StrategyRegistry { slots: self.slots }
    }
}
