//! The priority queue of pending [`Event`]s.

use std::collections::BinaryHeap;
use std::fmt;

use crate::error::EngineError;
use crate::event::{Event, SimTime};
use crate::message::Message;

/// The engine's queue of not-yet-delivered events.
///
/// Internally a binary max-heap ordered by `Reverse<Event>` so that
/// [`pop_next_batch`](EventQueue::pop_next_batch) always removes the
/// earliest events first. Ties are broken using [`Event`]'s full five-level
/// ordering, which is what gives the whole engine a single deterministic
/// processing order regardless of the order objects were registered or
/// events were scheduled in.
#[derive(Default)]
pub struct EventQueue {
    heap: BinaryHeap<std::cmp::Reverse<Event>>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a new event.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NegativeTime`] if either `send_time` or
    /// `delivery_time` is negative, or [`EngineError::CausalityViolation`]
    /// if `delivery_time < send_time`.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule(
        &mut self,
        send_time: SimTime,
        delivery_time: SimTime,
        sender: String,
        receiver: String,
        message: Box<dyn Message>,
        priority_rank: usize,
    ) -> Result<(), EngineError> {
        if send_time < 0.0 || delivery_time < 0.0 {
            return Err(EngineError::NegativeTime);
        }
        if delivery_time < send_time {
            return Err(EngineError::CausalityViolation(format!(
                "delivery_time {delivery_time} precedes send_time {send_time}"
            )));
        }
        self.heap.push(std::cmp::Reverse(Event {
            send_time,
            delivery_time,
            sender,
            receiver,
            message,
            priority_rank,
        }));
        Ok(())
    }

    /// The delivery time of the next event to be popped, if any.
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|std::cmp::Reverse(e)| e.delivery_time)
    }

    /// The receiver of the next event to be popped, if any.
    pub fn peek_next_receiver(&self) -> Option<&str> {
        self.heap.peek().map(|std::cmp::Reverse(e)| e.receiver.as_str())
    }

    /// Whether the queue holds no events.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of events currently pending.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Removes every event currently queued, discarding them.
    pub fn reset(&mut self) {
        self.heap.clear();
    }

    /// Whether any pending event names `object_name` as its receiver.
    ///
    /// Used by [`SimulationEngine::delete_object`](crate::engine::SimulationEngine::delete_object)
    /// to reject deleting an object with undelivered events still addressed
    /// to it.
    pub fn has_pending_for(&self, object_name: &str) -> bool {
        self.heap
            .iter()
            .any(|std::cmp::Reverse(e)| e.receiver == object_name)
    }

    /// Pops every event sharing the earliest `(delivery_time, receiver)`
    /// pair, returned in full `Event` order (so lowest `priority_rank`,
    /// then message order, first).
    ///
    /// This is the maximal batch that can be delivered to a single object in
    /// a single dispatch step: all events due at the same time for the same
    /// receiver, since dispatching them together is what lets a handler see
    /// every message addressed to it at this instant in one call.
    pub fn pop_next_batch(&mut self) -> Vec<Event> {
        let Some(std::cmp::Reverse(first)) = self.heap.pop() else {
            return Vec::new();
        };
        let delivery_time = first.delivery_time;
        let receiver = first.receiver.clone();
        let mut batch = vec![first];

        loop {
            match self.heap.peek() {
                Some(std::cmp::Reverse(next))
                    if next.delivery_time == delivery_time && next.receiver == receiver =>
                {
                    let std::cmp::Reverse(next) = self.heap.pop().unwrap();
                    batch.push(next);
                }
                _ => break,
            }
        }
        batch.sort();
        batch
    }

    /// Renders every pending event as a tab-separated log row, in delivery
    /// order, optionally restricted to events addressed to `filter_object`.
    pub fn render(&self, filter_object: Option<&str>) -> String {
        let mut events: Vec<&Event> = self
            .heap
            .iter()
            .map(|std::cmp::Reverse(e)| e)
            .filter(|e| match filter_object {
                Some(name) => e.receiver == name,
                None => true,
            })
            .collect();
        events.sort_by(|a, b| a.cmp(b));
        events
            .into_iter()
            .map(Event::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.heap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct Tick(u32);

    fn push(queue: &mut EventQueue, delivery_time: SimTime, sender: &str, receiver: &str, n: u32) {
        queue
            .schedule(
                0.0,
                delivery_time,
                sender.to_string(),
                receiver.to_string(),
                Box::new(Tick(n)),
                0,
            )
            .unwrap();
    }

    #[test]
    fn rejects_negative_time() {
        let mut queue = EventQueue::new();
        let err = queue
            .schedule(-1.0, 0.0, "a".into(), "b".into(), Box::new(Tick(0)), 0)
            .unwrap_err();
        assert_eq!(err, EngineError::NegativeTime);
    }

    #[test]
    fn rejects_delivery_before_send() {
        let mut queue = EventQueue::new();
        let err = queue
            .schedule(5.0, 1.0, "a".into(), "b".into(), Box::new(Tick(0)), 0)
            .unwrap_err();
        assert!(matches!(err, EngineError::CausalityViolation(_)));
    }

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        push(&mut queue, 2.0, "a", "x", 1);
        push(&mut queue, 1.0, "a", "y", 2);
        let batch = queue.pop_next_batch();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].delivery_time, 1.0);
    }

    #[test]
    fn batches_same_time_and_receiver() {
        let mut queue = EventQueue::new();
        push(&mut queue, 1.0, "a", "x", 1);
        push(&mut queue, 1.0, "b", "x", 2);
        push(&mut queue, 1.0, "a", "y", 3);
        let batch = queue.pop_next_batch();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|e| e.receiver == "x"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn has_pending_for_tracks_receiver() {
        let mut queue = EventQueue::new();
        push(&mut queue, 1.0, "a", "x", 1);
        assert!(queue.has_pending_for("x"));
        assert!(!queue.has_pending_for("y"));
    }

    #[test]
    fn batch_is_sorted_by_priority_rank_then_send_time_then_sender() {
        let mut queue = EventQueue::new();
        // All four share (delivery_time=1.0, receiver="x"), so they must
        // all land in one batch, ordered by priority_rank first, then
        // send_time, then sender name — never by insertion order.
        queue
            .schedule(0.5, 1.0, "zeta".into(), "x".into(), Box::new(Tick(1)), 1)
            .unwrap();
        queue
            .schedule(0.0, 1.0, "bob".into(), "x".into(), Box::new(Tick(2)), 0)
            .unwrap();
        queue
            .schedule(0.2, 1.0, "alice".into(), "x".into(), Box::new(Tick(3)), 0)
            .unwrap();
        queue
            .schedule(0.0, 1.0, "yara".into(), "x".into(), Box::new(Tick(4)), 1)
            .unwrap();

        let batch = queue.pop_next_batch();
        assert_eq!(batch.len(), 4);
        let senders: Vec<&str> = batch.iter().map(|e| e.sender.as_str()).collect();
        assert_eq!(
            senders,
            vec!["bob", "alice", "yara", "zeta"],
            "rank-0 events (bob, alice) precede rank-1 events (yara, zeta); \
             within a rank, earlier send_time (bob@0.0 before alice@0.2) wins"
        );
    }

    #[test]
    fn pop_next_batch_on_empty_queue_returns_empty_vec() {
        let mut queue = EventQueue::new();
        assert!(queue.pop_next_batch().is_empty());
    }
}
