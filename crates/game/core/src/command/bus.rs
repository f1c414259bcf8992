//! Command routing: per-kind subscriber lists and the deferred queue.
//!
//! All player intents flow through [`CommandBus`] to their handlers. The bus
//! decouples command issuers from game logic, keeps the pipeline testable
//! without any input framework, and gives replay and debugging tooling a
//! single choke point to observe.
//!
//! The bus is single-threaded. Interior mutability (`RefCell` fields behind
//! `&self` methods) lets handlers legally re-enter the bus (subscribe,
//! enqueue, dispatch) while a dispatch is in flight; every dispatch pass
//! iterates an immutable snapshot of the subscriber list taken at its start,
//! so such re-entry never affects the pass already running.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use strum::EnumCount;

use crate::command::{Command, CommandKind, DeliveryError, HandlerError};

type HandlerFn = dyn FnMut(&Command) -> Result<(), HandlerError>;

/// Token identifying one subscription, returned by [`CommandBus::subscribe`].
///
/// Closures have no structural identity in Rust, so unsubscription goes
/// through this token. Subscribing the same closure twice yields two distinct
/// tokens and two invocations per dispatch; entries are never deduplicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct HandlerEntry {
    id: HandlerId,
    callback: Rc<RefCell<HandlerFn>>,
}

impl HandlerEntry {
    fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

/// Routes commands to subscribed handlers, immediately or via a FIFO queue.
///
/// Subscriber lists are keyed by [`CommandKind`] in a fixed table, one
/// insertion-ordered list per kind. Dispatch invokes every subscriber of the
/// command's kind in subscription order, isolating handler failures so one
/// misbehaving subscriber cannot block delivery to the rest. Dispatching to
/// a kind with no subscribers is an expected no-op, not an error.
pub struct CommandBus {
    handlers: [RefCell<Vec<HandlerEntry>>; CommandKind::COUNT],
    queue: RefCell<VecDeque<Command>>,
    next_handler: Cell<u64>,
}

impl Default for CommandBus {
    fn default() -> Self {
        Self {
            handlers: std::array::from_fn(|_| RefCell::new(Vec::new())),
            queue: RefCell::new(VecDeque::new()),
            next_handler: Cell::new(0),
        }
    }
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to a command kind, appending it to that kind's
    /// dispatch order.
    pub fn subscribe<F>(&self, kind: CommandKind, handler: F) -> HandlerId
    where
        F: FnMut(&Command) -> Result<(), HandlerError> + 'static,
    {
        let id = HandlerId(self.next_handler.get());
        self.next_handler.set(id.0 + 1);
        self.slot(kind).borrow_mut().push(HandlerEntry {
            id,
            callback: Rc::new(RefCell::new(handler)),
        });
        tracing::debug!(%kind, handler = id.0, "handler subscribed");
        id
    }

    /// Removes the subscription identified by `id` from `kind`'s list.
    /// Returns false (without error) if the token is unknown there.
    pub fn unsubscribe(&self, kind: CommandKind, id: HandlerId) -> bool {
        let mut handlers = self.slot(kind).borrow_mut();
        let Some(index) = handlers.iter().position(|entry| entry.id == id) else {
            return false;
        };
        handlers.remove(index);
        tracing::debug!(%kind, handler = id.0, "handler unsubscribed");
        true
    }

    /// Routes a command to every subscriber of its kind, in subscription
    /// order, over a snapshot of the list taken before any handler runs.
    ///
    /// Fire-and-forget: results are observed through entity and tracker
    /// state. A failing handler is reported and skipped; the remaining
    /// snapshot entries still run.
    pub fn dispatch(&self, command: &Command) {
        let kind = command.kind();
        let snapshot: Vec<HandlerEntry> = self
            .slot(kind)
            .borrow()
            .iter()
            .map(HandlerEntry::snapshot)
            .collect();

        if snapshot.is_empty() {
            tracing::debug!(%kind, at = %command.issued_at(), "no handlers registered");
            return;
        }
        tracing::debug!(%kind, at = %command.issued_at(), handlers = snapshot.len(), "routing command");

        for entry in snapshot {
            let outcome = match entry.callback.try_borrow_mut() {
                Ok(mut callback) => {
                    (&mut *callback)(command)
                        .map_err(|cause| DeliveryError::Handler { kind, cause })
                }
                // The handler is already running further up the stack; a
                // recursive dispatch reached it again.
                Err(_) => Err(DeliveryError::Reentered { kind }),
            };

            if let Err(error) = outcome {
                tracing::warn!(handler = entry.id.0, "{error}");
            }
        }
    }

    /// Appends a command to the deferred queue without dispatching it.
    ///
    /// The queue is decoupled from the subscriber table: dispatch uses
    /// whatever subscribers exist at drain time, not at enqueue time.
    pub fn enqueue(&self, command: Command) {
        tracing::debug!(kind = %command.kind(), "command queued");
        self.queue.borrow_mut().push_back(command);
    }

    /// Dispatches queued commands in FIFO order until the queue is empty,
    /// including commands enqueued by handlers during the drain. Returns the
    /// number of commands dispatched.
    pub fn drain_queue(&self) -> usize {
        let mut drained = 0;
        loop {
            let Some(command) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.dispatch(&command);
            drained += 1;
        }
        drained
    }

    /// Discards all pending commands without dispatching them.
    pub fn clear_queue(&self) {
        let discarded = {
            let mut queue = self.queue.borrow_mut();
            let len = queue.len();
            queue.clear();
            len
        };
        if discarded > 0 {
            tracing::debug!(discarded, "command queue cleared");
        }
    }

    /// Number of handlers currently subscribed to `kind`.
    pub fn handler_count(&self, kind: CommandKind) -> usize {
        self.slot(kind).borrow().len()
    }

    /// Number of commands waiting in the deferred queue.
    pub fn queue_len(&self) -> usize {
        self.queue.borrow().len()
    }

    fn slot(&self, kind: CommandKind) -> &RefCell<Vec<HandlerEntry>> {
        &self.handlers[kind as usize]
    }
}
