//! Error types returned by the simulation core.

use std::fmt;

/// An error raised by the scheduler, the event queue, or a simulation
/// object's send/receive surface.
///
/// Every variant corresponds to one of the failure modes enumerated in the
/// core's error handling design: state-machine violations, scheduling
/// violations, and message-type surface violations. None of these are
/// recovered internally — they are always surfaced to the caller of the
/// offending operation, or, if raised from within a handler, they abort the
/// enclosing [`simulate`](crate::engine::SimulationEngine::simulate) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A dynamically-typed [`Record`](crate::message::Record) message was
    /// constructed with a different number of values than its declared
    /// field list.
    ArgumentCountMismatch {
        /// Name of the message type being constructed.
        type_name: String,
        /// Number of fields declared for this message type.
        expected: usize,
        /// Number of values actually supplied.
        got: usize,
    },
    /// `add_object` was called with a name already registered in this
    /// engine.
    DuplicateObjectName(String),
    /// `get_object`/`delete_object` named an object that is not registered,
    /// or `send_event` was called from an object that is not attached to an
    /// engine.
    UnregisteredObject(String),
    /// `initialize` was called on an engine that is past the `Configured`
    /// state, or `add_object`/`delete_object`/`set_stop_condition` was
    /// called on an engine that is already `Initialized` or later.
    AlreadyInitialized,
    /// `simulate` was called before `initialize`.
    NotInitialized,
    /// `simulate` was called on an engine with no registered objects.
    NoObjects,
    /// `simulate` was called on an engine whose event queue is empty after
    /// `initialize`.
    NoEvents,
    /// An event was scheduled with a negative `send_time` or
    /// `delivery_time`.
    NegativeTime,
    /// An event was scheduled with `delivery_time < send_time`, or an
    /// object's (or the engine's) simulated time would have to move
    /// backward to dispatch the next event.
    CausalityViolation(String),
    /// `send_event` was called with a message type that the sending
    /// object's declared `messages_sent` surface does not contain.
    UnregisteredMessageType {
        /// Name of the sending object.
        sender: String,
        /// Name of the message type that was not declared as sendable.
        message_type: &'static str,
    },
    /// A batch was dispatched to an object whose handler table has no entry
    /// for one of the batch's message types.
    UnhandledMessageType {
        /// Name of the receiving object.
        receiver: String,
        /// Name of the message type with no registered handler.
        message_type: &'static str,
    },
    /// `delete_object` was called on an object that still has events
    /// pending in the queue. See the `delete_object` open question in
    /// DESIGN.md for why this is rejected rather than silently dropping the
    /// pending events.
    ObjectHasPendingEvents(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentCountMismatch {
                type_name,
                expected,
                got,
            } => write!(
                f,
                "constructor for message '{type_name}' expects {expected} argument(s), but {got} provided"
            ),
            Self::DuplicateObjectName(name) => {
                write!(f, "cannot add simulation object '{name}', name already in use")
            }
            Self::UnregisteredObject(name) => {
                write!(f, "'{name}' is not a simulation object of this engine")
            }
            Self::AlreadyInitialized => write!(f, "simulation has already been initialized"),
            Self::NotInitialized => write!(f, "simulation has not been initialized"),
            Self::NoObjects => write!(f, "simulation has no objects"),
            Self::NoEvents => write!(f, "simulation has no events"),
            Self::NegativeTime => write!(f, "event scheduled with a negative time"),
            Self::CausalityViolation(detail) => write!(f, "causality violation: {detail}"),
            Self::UnregisteredMessageType {
                sender,
                message_type,
            } => write!(
                f,
                "'{sender}' sent a '{message_type}' message, which is not in its declared messages_sent"
            ),
            Self::UnhandledMessageType {
                receiver,
                message_type,
            } => write!(
                f,
                "'{receiver}' has no handler registered for message type '{message_type}'"
            ),
            Self::ObjectHasPendingEvents(name) => write!(
                f,
                "cannot delete simulation object '{name}', it has events pending in the queue"
            ),
        }
    }
}

impl std::error::Error for EngineError {}

/// Error raised when a handler aborts the enclosing `simulate` call.
///
/// Wraps the underlying [`EngineError`] together with the event that was
/// being dispatched when it was raised, so a caller can tell which batch
/// caused the abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationError {
    /// The error raised by the engine or by a handler.
    pub source: EngineError,
    /// Name of the object that was being dispatched to when `source` was
    /// raised.
    pub receiver: String,
    /// Simulated time at which `source` was raised.
    pub time: f64,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation ended with error while dispatching '{}' at t={}: {}",
            self.receiver, self.time, self.source
        )
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
