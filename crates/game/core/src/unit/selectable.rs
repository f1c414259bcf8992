//! Capability surface for entities the selection tracker can manage.
//!
//! Selection does not need the full unit API, only identity, the computed
//! eligibility predicate and the selection flag. Rather than open-ended
//! dynamic dispatch over arbitrary entity references, the capability is a
//! closed enum of selectable entity kinds. Today that is only units;
//! buildings join as a new variant when they exist.

use crate::types::UnitId;
use crate::unit::UnitHandle;

/// A selectable game entity, held by shared handle.
///
/// Cloning clones the handle, not the entity. Equality is identity equality.
#[derive(Clone, Debug)]
pub enum Selectable {
    Unit(UnitHandle),
}

impl Selectable {
    /// Identity of the underlying entity.
    pub fn id(&self) -> UnitId {
        match self {
            Self::Unit(unit) => unit.borrow().id(),
        }
    }

    /// Computed eligibility: whether the entity may currently be selected.
    pub fn can_be_selected(&self) -> bool {
        match self {
            Self::Unit(unit) => unit.borrow().can_be_selected(),
        }
    }

    /// Whether the entity currently carries the selection flag.
    pub fn is_selected(&self) -> bool {
        match self {
            Self::Unit(unit) => unit.borrow().is_selected(),
        }
    }

    pub(crate) fn set_selected(&self, selected: bool) {
        match self {
            Self::Unit(unit) => unit.borrow_mut().set_selected(selected),
        }
    }

    /// Returns the unit handle if this selectable is a unit.
    pub fn as_unit(&self) -> Option<&UnitHandle> {
        match self {
            Self::Unit(unit) => Some(unit),
        }
    }
}

impl From<UnitHandle> for Selectable {
    fn from(unit: UnitHandle) -> Self {
        Self::Unit(unit)
    }
}

impl PartialEq for Selectable {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Selectable {}
