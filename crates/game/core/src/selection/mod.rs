//! Selection tracking for player-controlled entities.
//!
//! [`SelectionTracker`] owns the set of currently-selected entities and keeps
//! each entity's selection flag in lockstep with set membership. It is a pure
//! collaborator of command handlers: the bus never calls it, and it knows
//! nothing about health changes. A unit that dies while selected stays in the
//! set until a handler removes it; it merely becomes ineligible for any new
//! selection.
//!
//! Every mutating operation emits at most one change notification, delivered
//! synchronously with a snapshot of the full selected set. Notification runs
//! after all internal borrows are released, so observers may query the
//! tracker re-entrantly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::unit::{Selectable, UnitHandle};

/// Token identifying a registered selection observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverFn = dyn FnMut(&[Selectable]);

struct ObserverEntry {
    id: ObserverId,
    callback: Rc<RefCell<ObserverFn>>,
}

/// Tracks the currently-selected entities and notifies observers on change.
///
/// Membership is insertion-ordered and keyed by entity identity. All
/// mutation paths silently reject entities whose eligibility predicate is
/// false at call time; policy no-ops (already present, already absent,
/// already empty) never notify.
#[derive(Default)]
pub struct SelectionTracker {
    selected: RefCell<Vec<Selectable>>,
    observers: RefCell<Vec<ObserverEntry>>,
    next_observer: Cell<u64>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a single entity, replacing any previous selection.
    ///
    /// Silently does nothing if the entity is not eligible. The clear of the
    /// previous set is silent; the call emits exactly one notification, for
    /// the new singleton set.
    pub fn select_single(&self, entity: &Selectable) {
        if !entity.can_be_selected() {
            tracing::debug!(entity = %entity.id(), "cannot select: entity not eligible");
            return;
        }

        self.deselect_all();
        {
            let mut selected = self.selected.borrow_mut();
            entity.set_selected(true);
            selected.push(entity.clone());
        }
        tracing::debug!(entity = %entity.id(), "selected single entity");

        self.notify();
    }

    /// Adds an entity to the selection without clearing it.
    ///
    /// No-op if the entity is ineligible or already selected; notifies once
    /// when it was actually added.
    pub fn add_to_selection(&self, entity: &Selectable) {
        if !self.add_silent(entity) {
            return;
        }
        tracing::debug!(entity = %entity.id(), total = self.selection_count(), "added to selection");

        self.notify();
    }

    /// Adds a batch of entities, notifying exactly once if at least one was
    /// actually added. Ineligible and already-selected entries are skipped.
    pub fn add_multiple(&self, entities: &[Selectable]) {
        let mut added_any = false;
        for entity in entities {
            added_any |= self.add_silent(entity);
        }

        if added_any {
            tracing::debug!(total = self.selection_count(), "added multiple to selection");
            self.notify();
        }
    }

    /// Removes an entity from the selection. No-op if it was not selected.
    pub fn remove_from_selection(&self, entity: &Selectable) {
        {
            let mut selected = self.selected.borrow_mut();
            let Some(index) = selected.iter().position(|s| s.id() == entity.id()) else {
                return;
            };
            let removed = selected.remove(index);
            removed.set_selected(false);
        }
        tracing::debug!(entity = %entity.id(), remaining = self.selection_count(), "removed from selection");

        self.notify();
    }

    /// Clears the selection, flipping every member's flag. No-op (and no
    /// notification) when already empty.
    pub fn clear_selection(&self) {
        if !self.deselect_all() {
            return;
        }
        tracing::debug!("selection cleared");

        self.notify();
    }

    /// Replaces the selection with the given entities: a clear followed by a
    /// batch add.
    ///
    /// Emits the notifications those two steps imply (one for the clear when
    /// the previous set was non-empty, one for the add when anything was
    /// added) and never collapses them into one.
    pub fn select_all(&self, entities: &[Selectable]) {
        self.clear_selection();
        self.add_multiple(entities);
    }

    /// Whether the entity is currently selected. Absent entities are simply
    /// not selected, never an error.
    pub fn is_selected(&self, entity: &Selectable) -> bool {
        self.selected
            .borrow()
            .iter()
            .any(|s| s.id() == entity.id())
    }

    /// Number of selected entities.
    pub fn selection_count(&self) -> usize {
        self.selected.borrow().len()
    }

    /// Whether anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.borrow().is_empty()
    }

    /// Snapshot of the selected set, in insertion order.
    pub fn selected(&self) -> Vec<Selectable> {
        self.selected.borrow().clone()
    }

    /// Handles of all selected units, in insertion order.
    pub fn selected_units(&self) -> Vec<UnitHandle> {
        self.selected
            .borrow()
            .iter()
            .filter_map(|s| s.as_unit().cloned())
            .collect()
    }

    /// Registers a selection-change observer.
    ///
    /// Observers run inline with the mutating call and receive the full
    /// selected-set snapshot; they are expected to be cheap.
    pub fn observe<F>(&self, callback: F) -> ObserverId
    where
        F: FnMut(&[Selectable]) + 'static,
    {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers.borrow_mut().push(ObserverEntry {
            id,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    /// Removes a previously registered observer. No-op if unknown.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|entry| entry.id != id);
        observers.len() < before
    }

    /// Adds without notifying. Returns true if the set actually changed.
    fn add_silent(&self, entity: &Selectable) -> bool {
        if !entity.can_be_selected() {
            tracing::debug!(entity = %entity.id(), "cannot add to selection: entity not eligible");
            return false;
        }
        if self.is_selected(entity) {
            return false;
        }

        entity.set_selected(true);
        self.selected.borrow_mut().push(entity.clone());
        true
    }

    /// Flips every member's flag and empties the set without notifying.
    /// Returns true if the set was non-empty.
    fn deselect_all(&self) -> bool {
        let mut selected = self.selected.borrow_mut();
        if selected.is_empty() {
            return false;
        }

        for entity in selected.iter() {
            entity.set_selected(false);
        }
        selected.clear();
        true
    }

    /// Delivers the current set to every observer, over snapshots taken
    /// before any observer runs.
    fn notify(&self) {
        let snapshot = self.selected();
        let observers: Vec<Rc<RefCell<ObserverFn>>> = self
            .observers
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();

        for observer in observers {
            match observer.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(&snapshot),
                Err(_) => {
                    tracing::warn!("selection observer re-entered while already running; skipped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlayerId, UnitId};
    use crate::unit::Unit;

    fn spawn(id: u32) -> Selectable {
        Unit::new(UnitId(id), "Villager", PlayerId::LOCAL, 100.0)
            .into_handle()
            .into()
    }

    /// Records the size of the set carried by each notification.
    fn record_events(tracker: &SelectionTracker) -> Rc<RefCell<Vec<usize>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tracker.observe(move |selected| sink.borrow_mut().push(selected.len()));
        events
    }

    #[test]
    fn select_single_sets_flag_and_notifies_once() {
        let tracker = SelectionTracker::new();
        let events = record_events(&tracker);
        let unit = spawn(1);

        tracker.select_single(&unit);

        assert_eq!(tracker.selection_count(), 1);
        assert!(unit.is_selected());
        assert!(tracker.is_selected(&unit));
        assert_eq!(*events.borrow(), vec![1]);
    }

    #[test]
    fn select_single_replaces_previous_with_one_notification() {
        let tracker = SelectionTracker::new();
        let (first, second) = (spawn(1), spawn(2));
        tracker.select_single(&first);
        let events = record_events(&tracker);

        tracker.select_single(&second);

        assert_eq!(tracker.selection_count(), 1);
        assert!(!first.is_selected());
        assert!(second.is_selected());
        // The internal clear is silent: exactly one notification, for the
        // new singleton.
        assert_eq!(*events.borrow(), vec![1]);
    }

    #[test]
    fn select_single_rejects_ineligible_without_touching_selection() {
        let tracker = SelectionTracker::new();
        let alive = spawn(1);
        tracker.select_single(&alive);
        let events = record_events(&tracker);

        let dead = spawn(2);
        dead.as_unit().unwrap().borrow_mut().apply_damage(200.0);
        tracker.select_single(&dead);

        assert_eq!(tracker.selection_count(), 1);
        assert!(alive.is_selected());
        assert!(!dead.is_selected());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn add_to_selection_is_idempotent() {
        let tracker = SelectionTracker::new();
        let events = record_events(&tracker);
        let unit = spawn(1);

        tracker.add_to_selection(&unit);
        tracker.add_to_selection(&unit);

        assert_eq!(tracker.selection_count(), 1);
        assert_eq!(*events.borrow(), vec![1]);
    }

    #[test]
    fn add_multiple_notifies_once_for_the_batch() {
        let tracker = SelectionTracker::new();
        let events = record_events(&tracker);
        let units = [spawn(1), spawn(2), spawn(3)];

        tracker.add_multiple(&units);

        assert_eq!(tracker.selection_count(), 3);
        assert_eq!(*events.borrow(), vec![3]);
    }

    #[test]
    fn add_multiple_skips_ineligible_and_duplicate_entries() {
        let tracker = SelectionTracker::new();
        let alive = spawn(1);
        let dead = spawn(2);
        dead.as_unit().unwrap().borrow_mut().apply_damage(200.0);
        tracker.add_to_selection(&alive);
        let events = record_events(&tracker);

        tracker.add_multiple(&[alive.clone(), dead.clone(), spawn(3)]);

        assert_eq!(tracker.selection_count(), 2);
        assert!(!dead.is_selected());
        assert_eq!(*events.borrow(), vec![2]);
    }

    #[test]
    fn add_multiple_with_nothing_to_add_stays_silent() {
        let tracker = SelectionTracker::new();
        let unit = spawn(1);
        tracker.add_to_selection(&unit);
        let events = record_events(&tracker);

        tracker.add_multiple(&[unit.clone()]);

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn remove_flips_flag_and_notifies() {
        let tracker = SelectionTracker::new();
        let unit = spawn(1);
        tracker.select_single(&unit);
        let events = record_events(&tracker);

        tracker.remove_from_selection(&unit);

        assert_eq!(tracker.selection_count(), 0);
        assert!(!unit.is_selected());
        assert_eq!(*events.borrow(), vec![0]);
    }

    #[test]
    fn remove_of_absent_entity_is_silent() {
        let tracker = SelectionTracker::new();
        let events = record_events(&tracker);

        tracker.remove_from_selection(&spawn(9));

        assert_eq!(tracker.selection_count(), 0);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn clear_notifies_once_with_empty_set() {
        let tracker = SelectionTracker::new();
        let units = [spawn(1), spawn(2), spawn(3)];
        tracker.add_multiple(&units);
        let events = record_events(&tracker);

        tracker.clear_selection();

        assert_eq!(tracker.selection_count(), 0);
        assert!(units.iter().all(|u| !u.is_selected()));
        assert_eq!(*events.borrow(), vec![0]);
    }

    #[test]
    fn clear_of_empty_selection_is_silent() {
        let tracker = SelectionTracker::new();
        let events = record_events(&tracker);

        tracker.clear_selection();

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn select_all_fires_clear_then_add_notifications() {
        let tracker = SelectionTracker::new();
        tracker.select_single(&spawn(1));
        let events = record_events(&tracker);

        tracker.select_all(&[spawn(2), spawn(3)]);

        assert_eq!(tracker.selection_count(), 2);
        // Two steps, two notifications: the clear (empty set) and the batch
        // add. Never collapsed into one.
        assert_eq!(*events.borrow(), vec![0, 2]);
    }

    #[test]
    fn select_all_over_empty_selection_notifies_only_for_the_add() {
        let tracker = SelectionTracker::new();
        let events = record_events(&tracker);

        tracker.select_all(&[spawn(1), spawn(2)]);

        assert_eq!(*events.borrow(), vec![2]);
    }

    #[test]
    fn is_selected_returns_false_for_unknown_entity() {
        let tracker = SelectionTracker::new();
        tracker.select_single(&spawn(1));

        assert!(!tracker.is_selected(&spawn(42)));
    }

    #[test]
    fn flags_and_set_stay_consistent_across_a_mixed_sequence() {
        let tracker = SelectionTracker::new();
        let units: Vec<Selectable> = (1..=4).map(spawn).collect();

        tracker.select_single(&units[0]);
        tracker.add_to_selection(&units[1]);
        tracker.add_multiple(&units[2..]);
        tracker.remove_from_selection(&units[1]);
        tracker.select_single(&units[3]);

        let flagged = units.iter().filter(|u| u.is_selected()).count();
        assert_eq!(tracker.selection_count(), flagged);
        for unit in &units {
            assert_eq!(unit.is_selected(), tracker.is_selected(unit));
        }
    }

    #[test]
    fn dead_unit_stays_selected_until_removed_but_cannot_reenter() {
        let tracker = SelectionTracker::new();
        let unit = spawn(1);
        tracker.select_single(&unit);

        unit.as_unit().unwrap().borrow_mut().apply_damage(200.0);

        // The tracker has no knowledge of health changes.
        assert!(tracker.is_selected(&unit));

        tracker.remove_from_selection(&unit);
        tracker.add_to_selection(&unit);

        assert_eq!(tracker.selection_count(), 0);
        assert!(!unit.is_selected());
    }

    #[test]
    fn removed_observer_no_longer_fires() {
        let tracker = SelectionTracker::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let id = tracker.observe(move |selected| sink.borrow_mut().push(selected.len()));

        tracker.select_single(&spawn(1));
        assert!(tracker.remove_observer(id));
        assert!(!tracker.remove_observer(id));
        tracker.select_single(&spawn(2));

        assert_eq!(*events.borrow(), vec![1]);
    }

    #[test]
    fn observers_can_query_the_tracker_reentrantly() {
        let tracker = Rc::new(SelectionTracker::new());
        let seen = Rc::new(Cell::new(0usize));
        {
            let inner = Rc::clone(&tracker);
            let seen = Rc::clone(&seen);
            tracker.observe(move |_| seen.set(inner.selection_count()));
        }

        tracker.add_multiple(&[spawn(1), spawn(2)]);

        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn selected_units_returns_handles_in_insertion_order() {
        let tracker = SelectionTracker::new();
        let units = [spawn(2), spawn(1), spawn(3)];
        tracker.add_multiple(&units);

        let ids: Vec<UnitId> = tracker
            .selected_units()
            .iter()
            .map(|u| u.borrow().id())
            .collect();

        assert_eq!(ids, vec![UnitId(2), UnitId(1), UnitId(3)]);
    }
}
