//! Read-only state shared across simulation objects.

use crate::event::SimTime;

/// A piece of state that simulation objects can read but the engine does
/// not schedule events against.
///
/// Corresponds to the core design's "shared state objects": things like a
/// running order book or counter that several objects consult, distinct
/// from the event-driven objects the engine dispatches batches to. An
/// engine may register any number of these alongside its simulation
/// objects; `simulate` never calls into them directly, it only makes them
/// available through [`SimulationEngine::get_simulation_state`](crate::engine::SimulationEngine::get_simulation_state).
pub trait SharedStateObserver: Send {
    /// This object's unique name within its engine.
    fn name(&self) -> &str;

    /// An opaque snapshot of this object's state as of `time`, the
    /// engine's current simulated time at the moment of the call.
    fn snapshot(&self, time: SimTime) -> String;
}
