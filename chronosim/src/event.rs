//! A single scheduled delivery of a [`Message`] from one simulation object
//! to another.

use std::cmp::Ordering;
use std::fmt;

use crate::message::Message;

/// Simulated time, expressed as a non-negative real number of simulated
/// seconds.
///
/// `chronosim` uses a plain `f64` rather than a fixed-point or
/// monotonic-timestamp type; see the time-representation note in
/// DESIGN.md for why.
pub type SimTime = f64;

/// A scheduled delivery of a [`Message`] at a future simulated time.
///
/// `Event`s are created by
/// [`SimulationObject::send_event`](crate::object::SimulationObject) and
/// consumed exactly once, when the engine pops them out of the
/// [`EventQueue`](crate::event_queue::EventQueue) and dispatches them to
/// their receiver.
///
/// Ordering compares, in order: `delivery_time`, `receiver`, `priority_rank`,
/// `send_time`, `sender`, then the message's own order as a final tie-break.
/// Putting `receiver` ahead of `send_time`/`sender` is what guarantees every
/// event sharing a `(delivery_time, receiver)` pair sits contiguously in the
/// total order, which is what lets a single batch be extracted as one
/// contiguous run; putting `priority_rank` ahead of `send_time`/`sender`
/// within that run is what lets a receiver's declared handler priority
/// override which object happened to send a message. `priority_rank` is
/// resolved once, at schedule time, rather than recomputed on every
/// comparison.
pub struct Event {
    /// Simulated time at which the sender issued this event.
    pub send_time: SimTime,
    /// Simulated time at which the event must be delivered. Always
    /// `>= send_time`.
    pub delivery_time: SimTime,
    /// Name of the sending object.
    pub sender: String,
    /// Name of the receiving object.
    pub receiver: String,
    /// The message payload.
    pub message: Box<dyn Message>,
    /// The receiving object's declared handler-table position for this
    /// message's type, resolved once when the event was scheduled. Lower
    /// values are delivered first within a batch. See [`Event`] ordering.
    pub priority_rank: usize,
}

impl Event {
    /// Renders this event as the tab-separated log row mandated by the
    /// core design: send time, delivery time, sender name, receiver name,
    /// message type, message values.
    pub fn render(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{:?}",
            self.send_time,
            self.delivery_time,
            self.sender,
            self.receiver,
            self.message.type_name(),
            self.message
        )
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("send_time", &self.send_time)
            .field("delivery_time", &self.delivery_time)
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("message", &self.message)
            .field("priority_rank", &self.priority_rank)
            .finish()
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.delivery_time
            .total_cmp(&other.delivery_time)
            .then_with(|| self.receiver.cmp(&other.receiver))
            .then_with(|| self.priority_rank.cmp(&other.priority_rank))
            .then_with(|| self.send_time.total_cmp(&other.send_time))
            .then_with(|| self.sender.cmp(&other.sender))
            .then_with(|| self.message.as_ref().total_cmp(other.message.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct Tick;

    fn event(
        delivery_time: SimTime,
        receiver: &str,
        priority_rank: usize,
        send_time: SimTime,
        sender: &str,
    ) -> Event {
        Event {
            send_time,
            delivery_time,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            message: Box::new(Tick),
            priority_rank,
        }
    }

    #[test]
    fn orders_by_delivery_time_first() {
        let earlier = event(1.0, "z", 0, 0.0, "z");
        let later = event(2.0, "a", 0, 0.0, "a");
        assert!(earlier < later);
    }

    #[test]
    fn ties_on_delivery_time_break_on_receiver() {
        let a = event(1.0, "a", 5, 0.5, "z");
        let b = event(1.0, "z", 0, 0.0, "a");
        assert!(a < b, "receiver name breaks the tie before priority or send_time");
    }

    #[test]
    fn ties_on_delivery_and_receiver_break_on_priority_rank() {
        let priority = event(1.0, "x", 0, 0.0, "bob");
        let ordinary = event(1.0, "x", 1, 0.0, "alice");
        assert!(
            priority < ordinary,
            "lower priority_rank is delivered first regardless of sender name"
        );
    }

    #[test]
    fn ties_on_priority_break_on_send_time_then_sender() {
        let a = event(1.0, "x", 0, 0.0, "zeta");
        let b = event(1.0, "x", 0, 0.5, "alpha");
        assert!(a < b, "send_time breaks the tie before sender name");

        let c = event(1.0, "x", 0, 0.0, "alice");
        let d = event(1.0, "x", 0, 0.0, "bob");
        assert!(c < d, "sender name is the final tie-break before message order");
    }
}
