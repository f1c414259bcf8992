//! Scripted console demo of the command pipeline.
//!
//! Composition root: owns the roster, wires the handlers, then pushes a
//! fixed sequence of commands through the bus and prints what happens to the
//! units. No graphics, no interactive input.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use warfront_core::{
    CommandBus, CommandKind, GameTime, MoveCommand, PlayerId, SelectCommand, SelectionMode,
    SelectionTracker, UnitId, UnitState, Vec3,
};

use crate::handlers::{move_handler, select_handler};
use crate::roster::Roster;

pub struct Demo {
    bus: CommandBus,
    tracker: Rc<SelectionTracker>,
    roster: Rc<RefCell<Roster>>,
    destination: Rc<Cell<Option<Vec3>>>,
    clock: Cell<f32>,
}

impl Demo {
    pub fn new() -> Self {
        let tracker = Rc::new(SelectionTracker::new());
        let roster = Rc::new(RefCell::new(Roster::new()));
        let destination = Rc::new(Cell::new(None));
        let bus = CommandBus::new();

        tracker.observe(|selected| {
            println!("   [event] selection changed - {} unit(s) selected", selected.len());
        });

        bus.subscribe(
            CommandKind::Select,
            select_handler(Rc::clone(&tracker), Rc::clone(&roster)),
        );
        bus.subscribe(
            CommandKind::Move,
            move_handler(Rc::clone(&roster), Rc::clone(&destination)),
        );

        Self {
            bus,
            tracker,
            roster,
            destination,
            clock: Cell::new(0.0),
        }
    }

    pub fn run(&self) -> Result<()> {
        println!("Warfront - command pipeline demo (console only)\n");

        for category in ["Villager", "Villager", "Soldier", "Archer"] {
            self.roster.borrow_mut().spawn(category, PlayerId::LOCAL);
        }
        println!("Spawned {} units for {}\n", self.roster.borrow().len(), PlayerId::LOCAL);
        self.print_units();

        self.section("Selection");

        println!("-> Selecting single unit (id 1)...");
        self.bus
            .dispatch(&SelectCommand::single(UnitId(1), SelectionMode::Replace, self.now()).into());

        println!("-> Adding unit 2 to the selection...");
        self.bus
            .dispatch(&SelectCommand::single(UnitId(2), SelectionMode::Add, self.now()).into());

        println!("-> Area-selecting units 3 and 4...");
        self.bus.dispatch(
            &SelectCommand::new(
                vec![UnitId(3), UnitId(4)],
                SelectionMode::Replace,
                self.now(),
            )
            .into(),
        );

        self.section("Movement");

        println!("-> Issuing a move command to the selected units...");
        let selected: Vec<UnitId> = self
            .tracker
            .selected_units()
            .iter()
            .map(|unit| unit.borrow().id())
            .collect();
        self.bus.dispatch(
            &MoveCommand::new(Vec3::new(100.0, 0.0, 50.0), selected, self.now()).into(),
        );

        println!("-> Simulating movement...");
        self.simulate_movement();

        self.section("Deferred commands");

        println!("-> Queueing a select and a move without dispatching...");
        self.bus
            .enqueue(SelectCommand::single(UnitId(2), SelectionMode::Replace, self.now()).into());
        self.bus.enqueue(
            MoveCommand::new(Vec3::new(0.0, 0.0, 0.0), vec![UnitId(2)], self.now()).into(),
        );
        println!("   queue length: {}", self.bus.queue_len());

        let drained = self.bus.drain_queue();
        println!("-> Drained {drained} queued command(s)");
        self.simulate_movement();

        self.section("Combat");

        let first = self.roster.borrow().find(UnitId(1))?;

        println!("-> Unit 1 takes 60 damage...");
        first.borrow_mut().apply_damage(60.0);
        println!("   {}", first.borrow());

        println!("-> Unit 1 takes 50 more damage...");
        let died = first.borrow_mut().apply_damage(50.0);
        println!("   {}", first.borrow());
        if died {
            println!("   Unit 1 has died");
        }

        println!("-> Trying to select the dead unit...");
        self.bus
            .dispatch(&SelectCommand::single(UnitId(1), SelectionMode::Replace, self.now()).into());
        println!(
            "   selection count: {} (dead units are not selectable)",
            self.tracker.selection_count()
        );

        self.section("Final state");
        self.print_units();

        Ok(())
    }

    /// Advances the demo clock; every command gets a fresh, monotonically
    /// increasing timestamp.
    fn now(&self) -> GameTime {
        let t = self.clock.get() + 0.1;
        self.clock.set(t);
        GameTime::new(t)
    }

    /// Teleports every moving unit to the recorded destination and returns
    /// it to idle. Movement is a state flag here, not a trajectory.
    fn simulate_movement(&self) {
        let Some(target) = self.destination.take() else {
            return;
        };

        for unit in self.roster.borrow().units() {
            let mut unit = unit.borrow_mut();
            if unit.state() == UnitState::Moving {
                unit.position = target;
                unit.set_state(UnitState::Idle);
                println!("   Unit {} arrived at {}", unit.id(), target);
            }
        }
    }

    fn print_units(&self) {
        println!("Current units:");
        for unit in self.roster.borrow().units() {
            let unit = unit.borrow();
            let mark = if unit.is_selected() { " [SELECTED]" } else { "" };
            println!("  {unit}{mark}");
        }
    }

    fn section(&self, title: &str) {
        println!("\n{}", "-".repeat(50));
        println!("DEMO: {title}");
        println!("{}\n", "-".repeat(50));
    }
}

impl Default for Demo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_scenario_runs_to_completion() {
        let demo = Demo::new();

        demo.run().unwrap();

        // Unit 1 died during the combat section. The final replace-select of
        // the dead unit cleared the selection and added nothing back.
        let roster = demo.roster.borrow();
        assert_eq!(roster.len(), 4);
        let first = roster.find(UnitId(1)).unwrap();
        assert_eq!(first.borrow().state(), UnitState::Dead);
        assert_eq!(demo.tracker.selection_count(), 0);
    }
}
