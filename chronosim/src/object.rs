//! The [`SimulationObject`] trait and the machinery objects use to schedule
//! events on each other.

use std::any::Any;
use std::collections::HashMap;

use crate::error::EngineError;
use crate::event::SimTime;
use crate::message::Message;

/// An object's declared mapping from message type name to its position in
/// that object's handler priority order.
///
/// Lower ranks are dispatched first when several distinct message types are
/// due to the same object at the same simulated time. An object that never
/// receives more than one message type at the same instant can leave every
/// rank at `0`.
///
/// Grounded in the core design's "Priority" vs "Ordinary" handler
/// classification: a `HandlerTable` is built by listing message types in
/// priority order, most urgent first, via [`HandlerTable::with_order`].
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    ranks: HashMap<&'static str, usize>,
}

impl HandlerTable {
    /// An empty table. Every message type implicitly ranks `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from message type names listed in priority order,
    /// most urgent (lowest rank) first.
    pub fn with_order(type_names: impl IntoIterator<Item = &'static str>) -> Self {
        let ranks = type_names
            .into_iter()
            .enumerate()
            .map(|(rank, name)| (name, rank))
            .collect();
        Self { ranks }
    }

    /// The declared rank for `type_name`, or `usize::MAX` if this table has
    /// no explicit entry for it (treated as lowest priority).
    pub fn rank_of(&self, type_name: &str) -> usize {
        self.ranks.get(type_name).copied().unwrap_or(usize::MAX)
    }

    /// Whether this table has an explicit entry for `type_name`.
    pub fn contains(&self, type_name: &str) -> bool {
        self.ranks.contains_key(type_name)
    }
}

/// A batch of messages delivered to one object at one simulated instant.
///
/// All events share the same `delivery_time`; they are ordered by
/// declared handler rank and then by the event ordering's remaining tie
/// breaks, matching the order the engine delivered them in.
pub struct EventList<'a> {
    entries: Vec<(&'a str, &'a dyn Message)>,
}

impl<'a> EventList<'a> {
    /// Builds a batch from `(sender_name, message)` pairs, already in the
    /// order the engine would deliver them in.
    ///
    /// The engine builds these internally during dispatch; this is exposed
    /// so that a `SimulationObject` implementation's own tests can drive
    /// `handle_event_list` directly without going through a full engine.
    pub fn new(entries: Vec<(&'a str, &'a dyn Message)>) -> Self {
        Self { entries }
    }

    /// Iterates over `(sender_name, message)` pairs, in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a dyn Message)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of messages in this batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this batch is empty. Never true for a batch the engine
    /// actually dispatches, but useful for object code built generically.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Downcasts every message of type `M` out of this batch, in order,
    /// ignoring messages of any other type.
    pub fn of_type<M: Any>(&self) -> impl Iterator<Item = (&'a str, &'a M)> + '_ {
        self.entries
            .iter()
            .filter_map(|(sender, message)| message.as_any().downcast_ref::<M>().map(|m| (*sender, m)))
    }
}

/// The handle an object uses to schedule new events while handling a batch.
///
/// Generalizes the local scheduling context a handler is given while it
/// runs: every `send_event` call is checked against the sender's declared
/// `messages_sent` surface and against causality (the new event's
/// `delivery_time` can never be in the object's own past).
pub struct SimulationContext<'a> {
    sender_name: &'a str,
    now: SimTime,
    messages_sent: &'a [&'static str],
    scheduled: Vec<ScheduledEvent>,
}

/// An event an object scheduled while handling a batch, not yet committed
/// to the engine's queue.
pub struct ScheduledEvent {
    /// Delay from the sender's current time, as passed to `send_event`.
    pub delay: SimTime,
    /// Name of the intended receiver.
    pub receiver: String,
    /// The message payload.
    pub message: Box<dyn Message>,
}

impl<'a> SimulationContext<'a> {
    /// Builds a context for an object currently at simulated time `now`,
    /// permitted to send the message types listed in `messages_sent`.
    ///
    /// The engine builds these internally during dispatch; this is exposed
    /// so that a `SimulationObject` implementation's own tests can drive
    /// `send_initial_events`/`handle_event_list` directly.
    pub fn new(sender_name: &'a str, now: SimTime, messages_sent: &'a [&'static str]) -> Self {
        Self {
            sender_name,
            now,
            messages_sent,
            scheduled: Vec::new(),
        }
    }

    /// The name of the object this context was handed to.
    pub fn sender_name(&self) -> &str {
        self.sender_name
    }

    /// The sender's current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedules `message` for delivery to `receiver` after `delay`
    /// simulated seconds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnregisteredMessageType`] if `M`'s type name is
    /// not present in the sender's declared `messages_sent`, or
    /// [`EngineError::NegativeTime`] if `delay` is negative.
    pub fn send_event<M: Message>(
        &mut self,
        delay: SimTime,
        receiver: impl Into<String>,
        message: M,
    ) -> Result<(), EngineError> {
        let type_name = message.type_name();
        if !self.messages_sent.contains(&type_name) {
            return Err(EngineError::UnregisteredMessageType {
                sender: self.sender_name.to_string(),
                message_type: type_name,
            });
        }
        if delay < 0.0 {
            return Err(EngineError::NegativeTime);
        }
        self.scheduled.push(ScheduledEvent {
            delay,
            receiver: receiver.into(),
            message: Box::new(message),
        });
        Ok(())
    }

    /// Every event scheduled on this context so far, for test introspection.
    pub fn scheduled(&self) -> &[ScheduledEvent] {
        &self.scheduled
    }

    pub(crate) fn into_scheduled(self) -> Vec<ScheduledEvent> {
        self.scheduled
    }
}

/// A participant in the simulation: something that can receive scheduled
/// events, react to them by possibly scheduling further events, and report
/// its own simulated time.
///
/// Implementors correspond to the core design's "simulation objects" —
/// the only kind of entity the engine schedules events for or dispatches
/// batches to.
pub trait SimulationObject: Send {
    /// This object's unique name within its engine.
    fn name(&self) -> &str;

    /// This object's current simulated time: the delivery time of the last
    /// batch it handled, or the time it was constructed at if it has not
    /// yet handled anything.
    fn time(&self) -> SimTime;

    /// Advances this object's notion of current time. Called by the engine
    /// immediately before dispatching a batch, and never moved backward.
    fn set_time(&mut self, time: SimTime);

    /// The message type names this object may pass to
    /// [`SimulationContext::send_event`].
    fn messages_sent(&self) -> &'static [&'static str];

    /// This object's declared handler priority order. Message types absent
    /// from the table rank last.
    fn handler_table(&self) -> &HandlerTable;

    /// A stable name for this object's concrete type, used as the first
    /// component of `event_counts` keys. Defaults to the Rust type name;
    /// override to report a more stable or domain-specific name.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once, when the engine is initialized, to let this object
    /// schedule whatever events kick off its behavior (for example, a
    /// periodic self-message).
    fn send_initial_events(&mut self, context: &mut SimulationContext) -> Result<(), EngineError>;

    /// Called once per batch of simultaneous, same-receiver events, in the
    /// order determined by this object's `handler_table`.
    fn handle_event_list(
        &mut self,
        events: &EventList,
        context: &mut SimulationContext,
    ) -> Result<(), EngineError>;

    /// An opaque, loggable snapshot of this object's internal state, for
    /// diagnostics. The default implementation reports nothing.
    fn get_state(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct Ping(u32);

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct Pong(u32);

    #[test]
    fn handler_table_ranks_by_declared_order() {
        let table = HandlerTable::with_order(["Ping", "Pong"]);
        assert_eq!(table.rank_of("Ping"), 0);
        assert_eq!(table.rank_of("Pong"), 1);
        assert!(table.contains("Ping"));
        assert!(!table.contains("Other"));
    }

    #[test]
    fn handler_table_ranks_unlisted_types_last() {
        let table = HandlerTable::with_order(["Ping"]);
        assert_eq!(table.rank_of("Unseen"), usize::MAX);
    }

    #[test]
    fn send_event_rejects_message_type_not_in_messages_sent() {
        let mut context = SimulationContext::new("sender", 0.0, &["chronosim::object::tests::Ping"]);
        let err = context.send_event(1.0, "receiver", Pong(1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnregisteredMessageType {
                sender: "sender".to_string(),
                message_type: "chronosim::object::tests::Pong",
            }
        );
    }

    #[test]
    fn send_event_rejects_negative_delay() {
        // A negative delay would schedule a delivery_time behind the
        // sender's own current time — the one causality violation a
        // `SimulationContext` can catch locally, before the event ever
        // reaches the queue.
        let mut context = SimulationContext::new("sender", 5.0, &["chronosim::object::tests::Ping"]);
        let err = context.send_event(-1.0, "receiver", Ping(1)).unwrap_err();
        assert_eq!(err, EngineError::NegativeTime);
    }

    #[test]
    fn send_event_accepts_declared_type_and_nonnegative_delay() {
        let mut context = SimulationContext::new("sender", 0.0, &["chronosim::object::tests::Ping"]);
        context.send_event(2.0, "receiver", Ping(1)).unwrap();
        let scheduled = context.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].delay, 2.0);
        assert_eq!(scheduled[0].receiver, "receiver");
    }

    #[test]
    fn event_list_of_type_downcasts_and_ignores_other_types() {
        let ping = Ping(1);
        let pong = Pong(2);
        let entries: Vec<(&str, &dyn Message)> = vec![("a", &ping), ("b", &pong)];
        let list = EventList::new(entries);
        let pings: Vec<_> = list.of_type::<Ping>().collect();
        assert_eq!(pings, vec![("a", &Ping(1))]);
    }
}
