//! Unit entity model and life-cycle state machine.
//!
//! A [`Unit`] is a freestanding game entity with immutable identity and
//! mutable combat state. All state mutation flows through the operations
//! here; none of them can fail. Damage and heal on an already-dead unit are
//! defined no-ops, because callers (command handlers, the demo driver) are
//! not required to pre-check liveness.

mod selectable;

pub use selectable::Selectable;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::types::{PlayerId, UnitId, Vec3};

/// Shared single-threaded handle to a unit.
///
/// Units are independently addressable objects; the selection tracker and
/// command handlers hold handles, none of them owns the unit exclusively.
pub type UnitHandle = Rc<RefCell<Unit>>;

/// Life-cycle state of a unit.
///
/// `Idle` loops through the activity states and back; `Dead` is terminal and
/// reachable only by damage depleting the unit's health.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitState {
    /// Doing nothing, waiting for commands.
    #[default]
    Idle,
    /// Moving to a target position.
    Moving,
    /// Gathering resources.
    Gathering,
    /// Attacking an enemy.
    Attacking,
    /// Dead. Terminal: the unit accepts no further mutation.
    Dead,
}

/// Health meter clamped to `[0, maximum]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    /// Creates a meter filled to its maximum.
    pub fn full(maximum: f32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Subtracts `amount`, clamping at zero. Returns true if the meter
    /// reached zero on this call.
    fn deplete(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount.max(0.0)).max(0.0);
        self.current == 0.0
    }

    /// Adds `amount`, clamping at the maximum.
    fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.maximum);
    }

    /// Returns true if the meter is at zero.
    pub fn is_depleted(&self) -> bool {
        self.current == 0.0
    }
}

/// A game unit (villager, soldier, etc.).
///
/// Identity (`id`, `owner`, `category`, `health.maximum`) is fixed at spawn;
/// position, state, health and the selection flag mutate in place.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    id: UnitId,
    owner: PlayerId,
    category: String,
    /// Current position in world space.
    pub position: Vec3,
    state: UnitState,
    health: Health,
    selected: bool,
}

impl Unit {
    /// Spawns a unit at the origin with full health, in the `Idle` state.
    pub fn new(id: UnitId, category: impl Into<String>, owner: PlayerId, max_health: f32) -> Self {
        Self {
            id,
            owner,
            category: category.into(),
            position: Vec3::ZERO,
            state: UnitState::Idle,
            health: Health::full(max_health),
            selected: false,
        }
    }

    /// Wraps this unit in a shared handle.
    pub fn into_handle(self) -> UnitHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn health(&self) -> Health {
        self.health
    }

    /// Returns true if the unit has not died.
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }

    /// Derived eligibility predicate: alive units with health remaining can
    /// be selected. Never stored, always computed.
    pub fn can_be_selected(&self) -> bool {
        self.health.current > 0.0 && self.state != UnitState::Dead
    }

    /// Whether this unit is currently in the selection set. Maintained by
    /// the selection tracker.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Applies damage to this unit. Returns true if the unit died on this
    /// call.
    ///
    /// No-op returning false if the unit is already dead. Health clamps at
    /// zero, and reaching zero transitions the unit to `Dead` in the same
    /// call, preserving the health-zero-iff-dead invariant.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.state == UnitState::Dead {
            return false;
        }

        if self.health.deplete(amount) {
            self.state = UnitState::Dead;
            tracing::debug!(unit = %self.id, "unit died");
            return true;
        }

        false
    }

    /// Heals this unit, clamped to maximum health. No-op if dead. Never
    /// changes state.
    pub fn heal(&mut self, amount: f32) {
        if self.state == UnitState::Dead {
            return;
        }

        self.health.restore(amount);
    }

    /// Sets the activity state. Invoked by command handlers, not by the
    /// core itself.
    ///
    /// Ignored on a dead unit, and `Dead` is not accepted as a target: the
    /// terminal transition happens only through [`Unit::apply_damage`].
    pub fn set_state(&mut self, state: UnitState) {
        if self.state == UnitState::Dead || state == UnitState::Dead {
            return;
        }

        self.state = state;
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unit {} ({}) - HP: {}/{} - State: {}",
            self.id, self.category, self.health.current, self.health.maximum, self.state
        )
    }
}
