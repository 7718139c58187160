//! Ready-made simulation objects useful for assembling benches and tests
//! without rewriting the same boilerplate object for every simulation.

use chronosim::error::EngineError;
use chronosim::event::SimTime;
use chronosim::object::{EventList, HandlerTable, SimulationContext, SimulationObject};
use chronosim::shared_state::SharedStateObserver;

/// A message a [`Ticker`] sends to itself to keep ticking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick;

/// A model that self-schedules at a fixed period, starting one period after
/// its first tick.
///
/// Useful for keeping a simulation alive for a fixed duration when no other
/// object would otherwise schedule events that far out, and for the
/// "periodic object" family of test scenarios.
pub struct Ticker {
    name: String,
    time: SimTime,
    first_delay: SimTime,
    period: SimTime,
    table: HandlerTable,
    ticks: u64,
}

impl Ticker {
    /// Creates a new `Ticker` named `name`, self-scheduling every `period`
    /// simulated seconds, first firing at `t = period`.
    pub fn new(name: impl Into<String>, period: SimTime) -> Self {
        Self::starting_at(name, period, period)
    }

    /// Creates a new `Ticker` whose first tick fires after `first_delay`
    /// simulated seconds, and every `period` seconds thereafter.
    ///
    /// Useful for matching a fixed start time that differs from the
    /// steady-state period, as in a bench that wants ticks at `t = 1, 3, 5,
    /// ...` rather than `t = period, 2*period, ...`.
    pub fn starting_at(name: impl Into<String>, first_delay: SimTime, period: SimTime) -> Self {
        Self {
            name: name.into(),
            time: 0.0,
            first_delay,
            period,
            table: HandlerTable::with_order(["chronosim_util::Tick"]),
            ticks: 0,
        }
    }

    /// Number of times this ticker has fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl SimulationObject for Ticker {
    fn name(&self) -> &str {
        &self.name
    }

    fn time(&self) -> SimTime {
        self.time
    }

    fn set_time(&mut self, time: SimTime) {
        self.time = time;
    }

    fn messages_sent(&self) -> &'static [&'static str] {
        &["chronosim_util::Tick"]
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.table
    }

    fn send_initial_events(&mut self, context: &mut SimulationContext) -> Result<(), EngineError> {
        let name = self.name.clone();
        context.send_event(self.first_delay, name, Tick)
    }

    fn handle_event_list(
        &mut self,
        events: &EventList,
        context: &mut SimulationContext,
    ) -> Result<(), EngineError> {
        self.ticks += events.len() as u64;
        let name = self.name.clone();
        context.send_event(self.period, name, Tick)
    }
}

/// A [`Ticker`] variant that self-schedules at a random period within a
/// fixed range instead of a fixed one, for benches that want to exercise a
/// simulation under jittery, non-uniform event arrival.
pub struct JitteredTicker {
    name: String,
    time: SimTime,
    min_period: SimTime,
    max_period: SimTime,
    table: HandlerTable,
    ticks: u64,
}

impl JitteredTicker {
    /// Creates a new `JitteredTicker` named `name`, self-scheduling at a
    /// period drawn uniformly from `[min_period, max_period)` each time it
    /// fires.
    pub fn new(name: impl Into<String>, min_period: SimTime, max_period: SimTime) -> Self {
        Self {
            name: name.into(),
            time: 0.0,
            min_period,
            max_period,
            table: HandlerTable::with_order(["chronosim_util::Tick"]),
            ticks: 0,
        }
    }

    /// Number of times this ticker has fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn next_period(&self) -> SimTime {
        rand::Rng::gen_range(&mut rand::thread_rng(), self.min_period..self.max_period)
    }
}

impl SimulationObject for JitteredTicker {
    fn name(&self) -> &str {
        &self.name
    }

    fn time(&self) -> SimTime {
        self.time
    }

    fn set_time(&mut self, time: SimTime) {
        self.time = time;
    }

    fn messages_sent(&self) -> &'static [&'static str] {
        &["chronosim_util::Tick"]
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.table
    }

    fn send_initial_events(&mut self, context: &mut SimulationContext) -> Result<(), EngineError> {
        let name = self.name.clone();
        context.send_event(self.next_period(), name, Tick)
    }

    fn handle_event_list(
        &mut self,
        events: &EventList,
        context: &mut SimulationContext,
    ) -> Result<(), EngineError> {
        self.ticks += events.len() as u64;
        let name = self.name.clone();
        context.send_event(self.next_period(), name, Tick)
    }
}

/// A message forwarded from one [`Ring`] member to the next.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Relay(pub u64);

/// A model that, on receiving a [`Relay`] message, forwards it to a fixed
/// successor after a fixed delay.
///
/// Chaining `Ring` instances into a cycle (each instance's `next` naming the
/// next instance, wrapping around) builds a cyclical relay: a message
/// introduced at one member circulates indefinitely, advancing the clock by
/// one delay step per hop.
pub struct Ring {
    name: String,
    next: String,
    delay: SimTime,
    time: SimTime,
    table: HandlerTable,
    hops: u64,
}

impl Ring {
    /// Creates a new ring member named `name` that forwards to `next` after
    /// `delay` simulated seconds.
    pub fn new(name: impl Into<String>, next: impl Into<String>, delay: SimTime) -> Self {
        Self {
            name: name.into(),
            next: next.into(),
            delay,
            time: 0.0,
            table: HandlerTable::with_order(["chronosim_util::Relay"]),
            hops: 0,
        }
    }

    /// Number of `Relay` messages this member has forwarded so far.
    pub fn hops(&self) -> u64 {
        self.hops
    }
}

impl SimulationObject for Ring {
    fn name(&self) -> &str {
        &self.name
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

    fn send_initial_events(&mut self, _context: &mut SimulationContext) -> Result<(), EngineError> {
        Ok(())
    }

    fn handle_event_list(
        &mut self,
        events: &EventList,
        context: &mut SimulationContext,
    ) -> Result<(), EngineError> {
        self.hops += events.len() as u64;
        for (_sender, relay) in events.of_type::<Relay>() {
            let next = self.next.clone();
            context.send_event(self.delay, next, Relay(relay.0))?;
        }
        Ok(())
    }
}

/// A message other objects send to have its text recorded by an
/// [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogEntry(pub String);

/// A simulation object that appends every [`LogEntry`] it receives to an
/// in-memory log, for test and example assertions.
pub struct EventLog {
    name: String,
    time: SimTime,
    table: HandlerTable,
    entries: Vec<(SimTime, String)>,
}

impl EventLog {
    /// Creates a new, empty log named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: 0.0,
            table: HandlerTable::with_order(["chronosim_util::LogEntry"]),
            entries: Vec::new(),
        }
    }

    /// Every entry recorded so far, in arrival order, paired with the
    /// simulated time it arrived at.
    pub fn entries(&self) -> &[(SimTime, String)] {
        &self.entries
    }
}

impl SimulationObject for EventLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn time(&self) -> SimTime {
        self.time
    }

    fn set_time(&mut self, time: SimTime) {
        self.time = time;
    }

    fn messages_sent(&self) -> &'static [&'static str] {
        &[]
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.table
    }

    fn send_initial_events(&mut self, _context: &mut SimulationContext) -> Result<(), EngineError> {
        Ok(())
    }

    fn handle_event_list(
        &mut self,
        events: &EventList,
        _context: &mut SimulationContext,
    ) -> Result<(), EngineError> {
        let time = self.time;
        for (_sender, entry) in events.of_type::<LogEntry>() {
            self.entries.push((time, entry.0.clone()));
        }
        Ok(())
    }

    fn get_state(&self) -> String {
        format!("{} entries", self.entries.len())
    }
}

/// A read-only view over an [`EventLog`]'s entry count, for registering as
/// a [`SharedStateObserver`] alongside the log itself.
///
/// `chronosim` gives shared-state observers and simulation objects separate
/// registries, so a log that wants to be both readable as a snapshot and
/// reachable as an event-driven object (as `EventLog` is) needs a thin
/// observer shim rather than implementing both traits on one type; this is
/// that shim, reading the count through a shared counter the two sides
/// agree on.
pub struct EntryCountObserver {
    name: String,
    count: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

impl EntryCountObserver {
    /// Creates a new observer reporting through `count`, which the paired
    /// log's owner is responsible for keeping up to date.
    pub fn new(name: impl Into<String>, count: std::sync::Arc<std::sync::atomic::AtomicU64>) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl SharedStateObserver for EntryCountObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self, time: SimTime) -> String {
        format!(
            "{} entries as of t={time}",
            self.count.load(std::sync::atomic::Ordering::Relaxed)
        )
    }
}
