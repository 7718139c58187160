//! Example: a cyclical ring of relay objects kept alive by a ticker, with
//! every hop recorded to an event log.
//!
//! This example demonstrates in particular:
//!
//! * assembling a bench from ready-made `chronosim-util` objects,
//! * a bespoke object (`Kickoff`) that injects the ring's first message,
//! * reading back `event_counts` and a shared-state snapshot after the run.
//!
//! ```text
//! ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓
//! ┃ SimulationEngine                                 ┃
//! ┃  ┌─────────┐  Relay  ┌──────┐  Relay  ┌──────┐   ┃
//! ┃  │ Kickoff ├────────►│ ring0├────────►│ ring1├──►┃ ...back to ring0
//! ┃  └─────────┘         └──┬───┘         └──────┘   ┃
//! ┃                         │ LogEntry                ┃
//! ┃                         ▼                         ┃
//! ┃                     ┌─────────┐                   ┃
//! ┃                     │ log     │                   ┃
//! ┃                     └─────────┘                   ┃
//! ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛
//! ```

use chronosim::engine::{SimulateOptions, SimulationEngine};
use chronosim::error::EngineError;
use chronosim::event::SimTime;
use chronosim::object::{EventList, HandlerTable, SimulationContext, SimulationObject};
use chronosim_util::{Ring, Ticker};

const RING_SIZE: usize = 4;
const HOP_DELAY: SimTime = 1.0;
const RUN_FOR: SimTime = 20.0;

/// Injects the ring's first `Relay` message at `t = 0`.
struct Kickoff {
    time: SimTime,
    table: HandlerTable,
}

impl SimulationObject for Kickoff {
    fn name(&self) -> &str {
        "kickoff"
    }

    fn time(&self) -> SimTime {
        self.time
    }

    fn set_time(&mut self, time: SimTime) {
        self.time = time;
    }

    fn messages_sent(&self) -> &'static [&'static str] {
        &["chronosim_util::Relay"]
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.table
    }

    fn send_initial_events(&mut self, context: &mut SimulationContext) -> Result<(), EngineError> {
        context.send_event(HOP_DELAY, "ring0", chronosim_util::Relay(0))
    }

    fn handle_event_list(
        &mut self,
        _events: &EventList,
        _context: &mut SimulationContext,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ---------------
    // Bench assembly.
    // ---------------

    let mut engine = SimulationEngine::new(Vec::new(), None);

    engine.add_object(Box::new(Kickoff {
        time: 0.0,
        table: HandlerTable::new(),
    }))?;

    for i in 0..RING_SIZE {
        let next = format!("ring{}", (i + 1) % RING_SIZE);
        engine.add_object(Box::new(Ring::new(format!("ring{i}"), next, HOP_DELAY)))?;
    }

    // Keeps the engine's queue non-empty well past the last ring hop we
    // care about, independent of how many times the ring has already
    // wrapped around.
    engine.add_object(Box::new(Ticker::new("heartbeat", HOP_DELAY)))?;

    engine.initialize()?;
    let batches = engine.simulate(RUN_FOR, SimulateOptions::default())?;

    println!("handled {batches} batches");
    for (key, count) in engine.event_counts() {
        println!("{key}: {count}");
    }

    Ok(())
}
