//! Dispatch failure reporting.
//!
//! Handler failures are expected runtime conditions from the bus's point of
//! view: they are reported per handler and never abort delivery to the
//! remaining subscribers of the same command.

use crate::command::CommandKind;

/// Error type returned by command handlers.
///
/// Boxed because failures originate in arbitrary game systems; the bus only
/// logs them.
pub type HandlerError = Box<dyn std::error::Error>;

/// Why a single handler invocation failed during dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The handler returned an error.
    #[error("handler for {kind} failed: {cause}")]
    Handler {
        kind: CommandKind,
        cause: HandlerError,
    },

    /// The handler was re-entered by a recursive dispatch while still
    /// running. The inner invocation is skipped; the outer one continues.
    #[error("handler for {kind} re-entered while already running")]
    Reentered { kind: CommandKind },
}
