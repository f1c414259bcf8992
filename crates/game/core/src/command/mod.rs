//! Command domain - player intents as pure data.
//!
//! Commands are immutable value objects produced by the input layer and
//! routed through the [`CommandBus`]. They carry parameters and a logical
//! timestamp, never behavior: handlers live in game-logic code and are bound
//! to a command kind at the bus, not inside the payload.
//!
//! The set of intents is a closed tagged union. Adding an intent means adding
//! a [`Command`] variant and its [`CommandKind`] discriminant; the compiler
//! then points at every match that needs extending.

mod bus;
mod error;

pub use bus::{CommandBus, HandlerId};
pub use error::{DeliveryError, HandlerError};

use crate::types::{GameTime, UnitId, Vec3};

/// Discriminant identifying a command's routing channel.
///
/// Used by the bus to key its per-kind subscriber lists.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    Select,
    Move,
}

/// A player intent, routed by kind to subscribed handlers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Select(SelectCommand),
    Move(MoveCommand),
}

impl Command {
    /// The routing discriminant for this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Select(_) => CommandKind::Select,
            Self::Move(_) => CommandKind::Move,
        }
    }

    /// Logical timestamp recorded when the command was constructed.
    pub fn issued_at(&self) -> GameTime {
        match self {
            Self::Select(cmd) => cmd.issued_at,
            Self::Move(cmd) => cmd.issued_at,
        }
    }
}

/// How a select intent combines with the existing selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// Replace the current selection (plain click).
    Replace,
    /// Add to the current selection (shift + click).
    Add,
    /// Toggle each entity's membership (ctrl + click).
    Toggle,
}

/// Intent to select units or buildings.
///
/// Covers single click, shift/ctrl click and marquee selection; the entity
/// list is ordered as the input layer produced it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectCommand {
    /// Entities the intent targets, in input order.
    pub unit_ids: Vec<UnitId>,
    pub mode: SelectionMode,
    pub issued_at: GameTime,
}

impl SelectCommand {
    pub fn new(unit_ids: Vec<UnitId>, mode: SelectionMode, issued_at: GameTime) -> Self {
        Self {
            unit_ids,
            mode,
            issued_at,
        }
    }

    /// Convenience constructor for a single-entity selection.
    pub fn single(unit_id: UnitId, mode: SelectionMode, issued_at: GameTime) -> Self {
        Self::new(vec![unit_id], mode, issued_at)
    }
}

impl From<SelectCommand> for Command {
    fn from(cmd: SelectCommand) -> Self {
        Self::Select(cmd)
    }
}

/// Intent to move units to a world-space target.
///
/// Issued when the player right-clicks terrain with units selected.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveCommand {
    pub target: Vec3,
    /// Units ordered as they appeared in the selection.
    pub unit_ids: Vec<UnitId>,
    pub issued_at: GameTime,
}

impl MoveCommand {
    pub fn new(target: Vec3, unit_ids: Vec<UnitId>, issued_at: GameTime) -> Self {
        Self {
            target,
            unit_ids,
            issued_at,
        }
    }
}

impl From<MoveCommand> for Command {
    fn from(cmd: MoveCommand) -> Self {
        Self::Move(cmd)
    }
}
