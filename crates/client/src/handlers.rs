//! Command handlers wiring the bus to game state.
//!
//! These are the "game logic" subscribers the core treats as external
//! collaborators: they resolve the unit ids carried by a command against the
//! roster and drive the selection tracker or unit state machines. Unknown
//! unit ids surface as handler errors, which the bus isolates and logs
//! without interrupting delivery to other subscribers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use warfront_core::{
    Command, HandlerError, Selectable, SelectionMode, SelectionTracker, UnitState, Vec3,
};

use crate::roster::Roster;

/// Builds the `Select` handler: applies the command's selection mode to the
/// tracker for every resolvable unit id.
pub fn select_handler(
    tracker: Rc<SelectionTracker>,
    roster: Rc<RefCell<Roster>>,
) -> impl FnMut(&Command) -> Result<(), HandlerError> {
    move |command| {
        let Command::Select(command) = command else {
            return Ok(());
        };

        if command.mode == SelectionMode::Replace {
            tracker.clear_selection();
        }

        for id in &command.unit_ids {
            let unit = roster.borrow().find(*id)?;
            let entity = Selectable::from(unit);
            match command.mode {
                SelectionMode::Replace | SelectionMode::Add => {
                    tracker.add_to_selection(&entity);
                }
                SelectionMode::Toggle => {
                    if tracker.is_selected(&entity) {
                        tracker.remove_from_selection(&entity);
                    } else {
                        tracker.add_to_selection(&entity);
                    }
                }
            }
        }

        Ok(())
    }
}

/// Builds the `Move` handler: flags every targeted unit as moving and
/// records the shared destination for the movement simulation step.
///
/// Movement is modeled as a state flag, not a trajectory; dead units ignore
/// the state change.
pub fn move_handler(
    roster: Rc<RefCell<Roster>>,
    destination: Rc<Cell<Option<Vec3>>>,
) -> impl FnMut(&Command) -> Result<(), HandlerError> {
    move |command| {
        let Command::Move(command) = command else {
            return Ok(());
        };

        destination.set(Some(command.target));
        for id in &command.unit_ids {
            let unit = roster.borrow().find(*id)?;
            unit.borrow_mut().set_state(UnitState::Moving);
        }

        Ok(())
    }
}
