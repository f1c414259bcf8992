//! Unit roster owned by the demo driver.
//!
//! The core deliberately has no registry of living units; commands carry unit
//! ids and resolving them is the handlers' job. The roster is that lookup
//! table on the client side.

use warfront_core::{PlayerId, Unit, UnitHandle, UnitId, Vec3};

/// Failure to resolve a unit id carried by a command.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("no unit with id {0}")]
    UnknownUnit(UnitId),
}

/// Ordered collection of spawned units with sequential id assignment.
pub struct Roster {
    units: Vec<UnitHandle>,
    next_id: u32,
}

impl Roster {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawns a unit for `owner` and places it at a spread-out position so
    /// the demo output is readable.
    pub fn spawn(&mut self, category: &str, owner: PlayerId) -> UnitHandle {
        let id = UnitId(self.next_id);
        self.next_id += 1;

        let mut unit = Unit::new(id, category, owner, 100.0);
        unit.position = Vec3::new(id.0 as f32 * 10.0, 0.0, id.0 as f32 * 5.0);

        let handle = unit.into_handle();
        self.units.push(handle.clone());
        handle
    }

    /// Resolves a unit id to its handle.
    pub fn find(&self, id: UnitId) -> Result<UnitHandle, RosterError> {
        self.units
            .iter()
            .find(|unit| unit.borrow().id() == id)
            .cloned()
            .ok_or(RosterError::UnknownUnit(id))
    }

    pub fn units(&self) -> &[UnitHandle] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut roster = Roster::new();

        let first = roster.spawn("Villager", PlayerId::LOCAL);
        let second = roster.spawn("Soldier", PlayerId::LOCAL);

        assert_eq!(first.borrow().id(), UnitId(1));
        assert_eq!(second.borrow().id(), UnitId(2));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn find_resolves_known_ids_only() {
        let mut roster = Roster::new();
        roster.spawn("Villager", PlayerId::LOCAL);

        assert!(roster.find(UnitId(1)).is_ok());
        assert!(matches!(
            roster.find(UnitId(9)),
            Err(RosterError::UnknownUnit(UnitId(9)))
        ));
    }
}
