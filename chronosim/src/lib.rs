//! A deterministic, single-threaded discrete-event simulation core.
//!
//! A discrete-event simulation advances not by wall-clock ticks but by
//! repeatedly picking the globally earliest pending [`Event`](event::Event)
//! and delivering it. `chronosim` provides the scheduler, the event queue,
//! and the object lifecycle that make that process total, deterministic,
//! and reproducible: given the same objects, the same handler code, and the
//! same initial events, two runs produce identical dispatch sequences and
//! identical [`event_counts`](engine::SimulationEngine::event_counts).
//!
//! # Building a simulation
//!
//! 1. Implement [`SimulationObject`](object::SimulationObject) for each
//!    participant type.
//! 2. Register instances with a fresh [`SimulationEngine`](engine::SimulationEngine)
//!    via `add_object`/`add_objects`.
//! 3. Call `initialize()` to let every object seed the queue, then
//!    `simulate(time_max, opts)` to run to completion.
//!
//! ```no_run
//! use chronosim::engine::{SimulateOptions, SimulationEngine};
//!
//! let mut engine = SimulationEngine::new(Vec::new(), None);
//! // engine.add_object(...)?;
//! # fn try_main(engine: &mut SimulationEngine) -> Result<(), Box<dyn std::error::Error>> {
//! engine.initialize()?;
//! let batches = engine.simulate(10.0, SimulateOptions::default())?;
//! println!("handled {batches} batches");
//! # Ok(())
//! # }
//! ```
//!
//! The companion `chronosim-util` crate supplies a few ready-made
//! [`SimulationObject`](object::SimulationObject) implementations —
//! periodic tickers, ring relays — for assembling benches and tests without
//! writing the same boilerplate object every time.

pub mod engine;
pub mod error;
pub mod event;
pub mod event_queue;
pub mod message;
pub mod object;
pub mod shared_state;

/// Re-exports of the types most programs built on `chronosim` need.
pub mod prelude {
    pub use crate::engine::{SimConfig, SimulateOptions, SimulationEngine, SimulationState};
    pub use crate::error::{EngineError, SimulationError};
    pub use crate::event::SimTime;
    pub use crate::message::Message;
    pub use crate::object::{EventList, HandlerTable, SimulationContext, SimulationObject};
    pub use crate::shared_state::SharedStateObserver;
}
