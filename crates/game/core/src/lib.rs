//! Action-routing and selection core for the Warfront RTS prototype.
//!
//! `warfront-core` turns discrete player intents (select units, move units)
//! into state transitions on in-memory unit entities, without depending on
//! any rendering or input framework. The pipeline: an input layer constructs
//! a [`Command`] and submits it to the [`CommandBus`], immediately or via the
//! deferred queue; the bus fans it out to subscribed handlers in subscription
//! order; handlers (game-logic code outside this crate) drive the
//! [`SelectionTracker`] and mutate [`Unit`] state.
//!
//! The crate is single-threaded and synchronous: no operation suspends or
//! blocks, and callers that share a bus, tracker or unit across threads must
//! serialize access themselves.

pub mod command;
pub mod selection;
pub mod types;
pub mod unit;

pub use command::{
    Command, CommandBus, CommandKind, DeliveryError, HandlerError, HandlerId, MoveCommand,
    SelectCommand, SelectionMode,
};
pub use selection::{ObserverId, SelectionTracker};
pub use types::{GameTime, PlayerId, UnitId, Vec3};
pub use unit::{Health, Selectable, Unit, UnitHandle, UnitState};
