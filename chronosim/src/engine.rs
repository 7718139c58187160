//! The simulation engine: owns every object, the event queue, and the
//! global clock, and drives the dispatch loop.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::{EngineError, SimulationError};
use crate::event::SimTime;
use crate::event_queue::EventQueue;
use crate::message::Message;
use crate::object::{EventList, SimulationContext, SimulationObject};
use crate::shared_state::SharedStateObserver;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// The engine's lifecycle state.
///
/// `reset` returns the engine to `Empty` from any other state. Every other
/// transition is one-directional, matching the core design's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineState {
    /// No objects registered yet.
    Empty,
    /// At least one object registered; not yet initialized.
    Configured,
    /// `initialize` has run; the queue has been seeded.
    Initialized,
    /// Inside `simulate`.
    Running,
    /// `simulate` returned normally.
    Terminated,
}

/// The run configuration an external metadata collaborator would persist
/// alongside a run: start time, end time, and the directory it writes to.
/// `chronosim` itself never touches `metadata_dir`; it only carries the
/// value through to [`SimulationState`] for whatever collaborator wants it.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated time the run started at. Always `0.0` for a fresh engine.
    pub start_time: SimTime,
    /// The `time_max` passed to `simulate`.
    pub time_max: SimTime,
    /// Directory reserved for run metadata and checkpoints.
    pub metadata_dir: Option<PathBuf>,
}

/// Bundles the optional parameters accepted by [`SimulationEngine::simulate`].
///
/// Grouping these into one struct, rather than a long list of optional
/// positional parameters, matches the builder-style option structs used
/// throughout the core this one is modeled on.
#[derive(Default)]
pub struct SimulateOptions {
    /// Overrides the engine's configured stop condition for this run only,
    /// if set.
    pub stop_condition: Option<Box<dyn Fn(SimTime) -> bool + Send>>,
    /// Called with the simulated time reached after every dispatched batch.
    pub progress: Option<Box<dyn FnMut(SimTime) + Send>>,
    /// Directory an external metadata collaborator may use to persist run
    /// metadata and checkpoints. `chronosim` stores this value and reports
    /// it back through [`SimulationState`] but never writes to it itself.
    pub metadata_dir: Option<PathBuf>,
}

impl fmt::Debug for SimulateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulateOptions")
            .field("stop_condition", &self.stop_condition.is_some())
            .field("progress", &self.progress.is_some())
            .field("metadata_dir", &self.metadata_dir)
            .finish()
    }
}

/// A point-in-time snapshot of the engine, returned by
/// [`SimulationEngine::get_simulation_state`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationState {
    /// Current (or final) global simulated time.
    pub time: SimTime,
    /// Names of every registered simulation object.
    pub object_names: Vec<String>,
    /// Snapshots from every registered shared-state observer, keyed by
    /// observer name.
    pub shared_state: Vec<(String, String)>,
    /// The engine's lifecycle state at the moment of the snapshot.
    pub engine_state: EngineState,
}

/// Owns every simulation object, the pending event queue, and the clock,
/// and runs the scheduling loop that is the reason this crate exists.
pub struct SimulationEngine {
    time: SimTime,
    simulation_objects: HashMap<String, Box<dyn SimulationObject>>,
    shared_state: Vec<Box<dyn SharedStateObserver>>,
    event_queue: EventQueue,
    event_counts: HashMap<String, u64>,
    state: EngineState,
    stop_condition: Option<Box<dyn Fn(SimTime) -> bool + Send>>,
}

impl SimulationEngine {
    /// An empty, unconfigured engine.
    pub fn new(
        shared_state: Vec<Box<dyn SharedStateObserver>>,
        stop_condition: Option<Box<dyn Fn(SimTime) -> bool + Send>>,
    ) -> Self {
        Self {
            time: 0.0,
            simulation_objects: HashMap::new(),
            shared_state,
            event_queue: EventQueue::new(),
            event_counts: HashMap::new(),
            state: EngineState::Empty,
            stop_condition,
        }
    }

    /// The engine's current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The engine's current global simulated time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    fn require_pre_init(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Empty | EngineState::Configured => Ok(()),
            _ => Err(EngineError::AlreadyInitialized),
        }
    }

    /// Registers a new simulation object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateObjectName`] if an object with this
    /// name is already registered, or [`EngineError::AlreadyInitialized`]
    /// if called after `initialize`.
    pub fn add_object(&mut self, object: Box<dyn SimulationObject>) -> Result<(), EngineError> {
        self.require_pre_init()?;
        let name = object.name().to_string();
        if self.simulation_objects.contains_key(&name) {
            return Err(EngineError::DuplicateObjectName(name));
        }
        #[cfg(feature = "tracing")]
        debug!(object = %name, "registering simulation object");
        self.simulation_objects.insert(name, object);
        self.state = EngineState::Configured;
        Ok(())
    }

    /// Registers several simulation objects in order, stopping at the first
    /// failure.
    pub fn add_objects(
        &mut self,
        objects: impl IntoIterator<Item = Box<dyn SimulationObject>>,
    ) -> Result<(), EngineError> {
        for object in objects {
            self.add_object(object)?;
        }
        Ok(())
    }

    /// Removes a registered object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnregisteredObject`] if no object of this name
    /// is registered, [`EngineError::AlreadyInitialized`] if called after
    /// `initialize`, or [`EngineError::ObjectHasPendingEvents`] if the
    /// object still has events addressed to it in the queue.
    pub fn delete_object(&mut self, name: &str) -> Result<(), EngineError> {
        self.require_pre_init()?;
        if !self.simulation_objects.contains_key(name) {
            return Err(EngineError::UnregisteredObject(name.to_string()));
        }
        if self.event_queue.has_pending_for(name) {
            return Err(EngineError::ObjectHasPendingEvents(name.to_string()));
        }
        self.simulation_objects.remove(name);
        if self.simulation_objects.is_empty() {
            self.state = EngineState::Empty;
        }
        Ok(())
    }

    /// Looks up a registered object by name.
    pub fn get_object(&self, name: &str) -> Result<&dyn SimulationObject, EngineError> {
        self.simulation_objects
            .get(name)
            .map(|o| o.as_ref())
            .ok_or_else(|| EngineError::UnregisteredObject(name.to_string()))
    }

    /// Every registered object's name, unordered.
    pub fn get_objects(&self) -> Vec<&str> {
        self.simulation_objects.keys().map(String::as_str).collect()
    }

    /// Sets (or replaces) the stop condition checked at the top of every
    /// loop iteration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyInitialized`] if called after
    /// `initialize`.
    pub fn set_stop_condition(
        &mut self,
        stop_condition: impl Fn(SimTime) -> bool + Send + 'static,
    ) -> Result<(), EngineError> {
        self.require_pre_init()?;
        self.stop_condition = Some(Box::new(stop_condition));
        Ok(())
    }

    /// Seeds the event queue by calling `send_initial_events` on every
    /// registered object, then transitions to `Initialized`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyInitialized`] if called more than once,
    /// or propagates whatever error an object's `send_initial_events` or a
    /// resulting `send_event` call raised.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Configured => {}
            EngineState::Empty => return Err(EngineError::NoObjects),
            _ => return Err(EngineError::AlreadyInitialized),
        }

        #[cfg(feature = "tracing")]
        info!(objects = self.simulation_objects.len(), "initializing simulation");

        let names: Vec<String> = self.simulation_objects.keys().cloned().collect();
        for name in names {
            let mut object = self.simulation_objects.remove(&name).expect("known name");
            let mut context = SimulationContext::new(&name, object.time(), object.messages_sent());
            let result = object.send_initial_events(&mut context);
            self.simulation_objects.insert(name.clone(), object);
            result?;
            self.drain_scheduled(&name, context)?;
        }

        self.state = EngineState::Initialized;
        Ok(())
    }

    fn drain_scheduled(&mut self, sender: &str, context: SimulationContext) -> Result<(), EngineError> {
        let send_time = self
            .simulation_objects
            .get(sender)
            .map(|o| o.time())
            .ok_or_else(|| EngineError::UnregisteredObject(sender.to_string()))?;
        for scheduled in context.into_scheduled() {
            let priority_rank = self
                .simulation_objects
                .get(&scheduled.receiver)
                .map(|o| o.handler_table().rank_of(scheduled.message.type_name()))
                .ok_or_else(|| EngineError::UnregisteredObject(scheduled.receiver.clone()))?;
            self.event_queue.schedule(
                send_time,
                send_time + scheduled.delay,
                sender.to_string(),
                scheduled.receiver,
                scheduled.message,
                priority_rank,
            )?;
        }
        Ok(())
    }

    /// Runs the scheduling loop until a termination condition fires.
    ///
    /// Returns the number of batches handled. See the module-level
    /// termination diagnostics: exactly one of "No events remain", "End
    /// time exceeded", or "Terminate with stop condition satisfied" is
    /// logged (and, for the stop-condition case, there is no other way to
    /// observe which branch fired except via the returned count and the
    /// log).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] if `initialize` has not run,
    /// [`EngineError::NoObjects`] if no objects are registered, or
    /// [`EngineError::NoEvents`] if the queue is empty at entry. Once
    /// running, a causality violation or a handler error aborts the run
    /// with a [`SimulationError`] naming the event being dispatched.
    pub fn simulate(
        &mut self,
        time_max: SimTime,
        mut opts: SimulateOptions,
    ) -> Result<u64, SimulationError> {
        self.enter_running().map_err(|source| SimulationError {
            source,
            receiver: String::new(),
            time: self.time,
        })?;

        let is_override = opts.stop_condition.is_some();
        let stop_condition = opts.stop_condition.take().or_else(|| self.stop_condition.take());
        let result = self.run_loop(time_max, stop_condition.as_deref(), opts.progress.as_deref_mut());
        if !is_override {
            if let Some(stop_condition) = stop_condition {
                self.stop_condition = Some(stop_condition);
            }
        }
        self.state = EngineState::Terminated;
        result
    }

    /// Alias for [`SimulationEngine::simulate`], matching the core design's
    /// external interface naming.
    pub fn run(&mut self, time_max: SimTime, opts: SimulateOptions) -> Result<u64, SimulationError> {
        self.simulate(time_max, opts)
    }

    fn enter_running(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Initialized {
            return Err(EngineError::NotInitialized);
        }
        if self.simulation_objects.is_empty() {
            return Err(EngineError::NoObjects);
        }
        if self.event_queue.is_empty() {
            return Err(EngineError::NoEvents);
        }
        self.state = EngineState::Running;
        Ok(())
    }

    fn run_loop(
        &mut self,
        time_max: SimTime,
        stop_condition: Option<&(dyn Fn(SimTime) -> bool + Send)>,
        mut progress: Option<&mut (dyn FnMut(SimTime) + Send)>,
    ) -> Result<u64, SimulationError> {
        let mut batches_handled: u64 = 0;

        loop {
            if let Some(stop_condition) = stop_condition {
                if stop_condition(self.time) {
                    #[cfg(feature = "tracing")]
                    info!(time = self.time, "Terminate with stop condition satisfied");
                    return Ok(batches_handled);
                }
            }

            let Some(t_next) = self.event_queue.peek_next_time() else {
                #[cfg(feature = "tracing")]
                info!("No events remain");
                return Ok(batches_handled);
            };

            if t_next > time_max {
                #[cfg(feature = "tracing")]
                info!(t_next, time_max, "End time exceeded");
                return Ok(batches_handled);
            }

            let receiver = self
                .event_queue
                .peek_next_receiver()
                .expect("queue is non-empty because peek_next_time returned Some")
                .to_string();

            let object_time = self
                .simulation_objects
                .get(&receiver)
                .map(|o| o.time())
                .ok_or_else(|| SimulationError {
                    source: EngineError::UnregisteredObject(receiver.clone()),
                    receiver: receiver.clone(),
                    time: self.time,
                })?;

            if t_next < object_time {
                let err = EngineError::CausalityViolation(format!(
                    "'{receiver}' time {object_time} would move backward to {t_next}"
                ));
                #[cfg(feature = "tracing")]
                warn!(object = %receiver, %err, "causality violation");
                return Err(SimulationError {
                    source: err,
                    receiver,
                    time: self.time,
                });
            }

            self.time = t_next;
            if let Some(object) = self.simulation_objects.get_mut(&receiver) {
                object.set_time(t_next);
            }

            let batch = self.event_queue.pop_next_batch();

            let mut object = self.simulation_objects.remove(&receiver).ok_or_else(|| SimulationError {
                source: EngineError::UnregisteredObject(receiver.clone()),
                receiver: receiver.clone(),
                time: self.time,
            })?;

            for event in &batch {
                let message_type = event.message.type_name();
                if !object.handler_table().contains(message_type) {
                    self.simulation_objects.insert(receiver.clone(), object);
                    return Err(SimulationError {
                        source: EngineError::UnhandledMessageType {
                            receiver: receiver.clone(),
                            message_type,
                        },
                        receiver,
                        time: self.time,
                    });
                }
                let object_type = object.type_name();
                let key = format!("{object_type} - {receiver} - {message_type}");
                *self.event_counts.entry(key).or_insert(0) += 1;
            }

            #[cfg(feature = "tracing")]
            debug!(object = %receiver, time = t_next, batch_len = batch.len(), "dispatching batch");

            let entries: Vec<(&str, &dyn Message)> =
                batch.iter().map(|e| (e.sender.as_str(), e.message.as_ref())).collect();
            let event_list = EventList::new(entries);
            let mut context = SimulationContext::new(&receiver, t_next, object.messages_sent());
            let handled = object.handle_event_list(&event_list, &mut context);

            self.simulation_objects.insert(receiver.clone(), object);

            if let Err(source) = handled {
                return Err(SimulationError {
                    source,
                    receiver,
                    time: self.time,
                });
            }

            self.drain_scheduled(&receiver, context)
                .map_err(|source| SimulationError {
                    source,
                    receiver: receiver.clone(),
                    time: self.time,
                })?;

            if let Some(progress) = progress.as_deref_mut() {
                progress(t_next);
            }

            batches_handled += 1;
        }
    }

    /// Clears every object, every pending event, every counter, and returns
    /// the engine to `Empty`.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.simulation_objects.clear();
        self.event_queue.reset();
        self.event_counts.clear();
        self.state = EngineState::Empty;
    }

    /// Renders every pending event in the queue as tab-separated rows, one
    /// object's queue per call.
    pub fn message_queues(&self) -> String {
        self.event_queue.render(None)
    }

    /// Renders the `event_counts` table as one "key: count" row per line,
    /// sorted by key for reproducible output.
    pub fn provide_event_counts(&self) -> String {
        let mut entries: Vec<(&String, &u64)> = self.event_counts.iter().collect();
        entries.sort_by_key(|(key, _)| key.as_str());
        entries
            .into_iter()
            .map(|(key, count)| format!("{key}: {count}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A structured snapshot of the engine's current state.
    pub fn get_simulation_state(&self) -> SimulationState {
        SimulationState {
            time: self.time,
            object_names: self.simulation_objects.keys().cloned().collect(),
            shared_state: self
                .shared_state
                .iter()
                .map(|o| (o.name().to_string(), o.snapshot(self.time)))
                .collect(),
            engine_state: self.state,
        }
    }

    /// The raw event-count table, keyed by `"ObjectType - objectName -
    /// MessageType"`.
    pub fn event_counts(&self) -> &HashMap<String, u64> {
        &self.event_counts
    }
}


/// Property-based tests for the invariants listed in the core design's
/// "testable properties": reproducibility across repeated runs, and
/// monotonicity of both the global clock and every object's own clock.
#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::object::{EventList, HandlerTable, SimulationContext, SimulationObject};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct Pulse;

    /// A self-scheduling object that records, on every batch it handles,
    /// its own name and its own current time into a shared log — the
    /// instrumentation a property test needs to check per-object clock
    /// monotonicity without adding introspection hooks to the public API.
    struct Pulser {
        name: String,
        time: SimTime,
        period: SimTime,
        table: HandlerTable,
        log: Arc<Mutex<Vec<(String, SimTime)>>>,
    }

    impl Pulser {
        fn new(name: impl Into<String>, period: SimTime, log: Arc<Mutex<Vec<(String, SimTime)>>>) -> Self {
            Self {
                name: name.into(),
                time: 0.0,
                period,
                table: HandlerTable::with_order(["chronosim::engine::property_tests::Pulse"]),
                log,
            }
        }
    }

    impl SimulationObject for Pulser {
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
            &["chronosim::engine::property_tests::Pulse"]
        }
        fn handler_table(&self) -> &HandlerTable {
            &self.table
        }
        fn send_initial_events(&mut self, context: &mut SimulationContext) -> Result<(), EngineError> {
            let name = self.name.clone();
            context.send_event(self.period, name, Pulse)
        }
        fn handle_event_list(
            &mut self,
            _events: &EventList,
            context: &mut SimulationContext,
        ) -> Result<(), EngineError> {
            self.log.lock().unwrap().push((self.name.clone(), self.time));
            let name = self.name.clone();
            context.send_event(self.period, name, Pulse)
        }
    }

    fn build_fleet(num_objects: usize, period: SimTime, log: Arc<Mutex<Vec<(String, SimTime)>>>) -> SimulationEngine {
        let mut engine = SimulationEngine::new(Vec::new(), None);
        for i in 0..num_objects {
            engine
                .add_object(Box::new(Pulser::new(format!("p{i}"), period, log.clone())))
                .unwrap();
        }
        engine
    }

    /// Runs a fresh fleet of `num_objects` pulsers to `time_max` and returns
    /// the global-time trace seen by the progress callback, the sorted
    /// `event_counts` rendering, and the per-object dispatch log.
    fn run_fleet(
        num_objects: usize,
        period: SimTime,
        time_max: SimTime,
    ) -> (Vec<SimTime>, String, Vec<(String, SimTime)>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut engine = build_fleet(num_objects, period, log.clone());
        engine.initialize().unwrap();

        let time_trace = Arc::new(Mutex::new(Vec::new()));
        let trace_handle = time_trace.clone();
        let opts = SimulateOptions {
            progress: Some(Box::new(move |t| trace_handle.lock().unwrap().push(t))),
            ..SimulateOptions::default()
        };
        engine.simulate(time_max, opts).unwrap();

        let trace = time_trace.lock().unwrap().clone();
        let counts = engine.provide_event_counts();
        let dispatch_log = log.lock().unwrap().clone();
        (trace, counts, dispatch_log)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Invariant: two runs built from identical inputs (same object
        /// set, same handlers, same initial events) dispatch identical
        /// batches and accumulate identical `event_counts`.
        #[test]
        fn repeated_runs_are_reproducible(
            num_objects in 1usize..5,
            period in 1u32..4,
            time_max in 1u32..30,
        ) {
            let (trace_a, counts_a, log_a) = run_fleet(num_objects, period as SimTime, time_max as SimTime);
            let (trace_b, counts_b, log_b) = run_fleet(num_objects, period as SimTime, time_max as SimTime);

            prop_assert_eq!(counts_a, counts_b);
            prop_assert_eq!(trace_a, trace_b);
            prop_assert_eq!(log_a, log_b);
        }

        /// Invariant: the global clock observed after each dispatched batch
        /// is monotonically non-decreasing.
        #[test]
        fn global_clock_is_monotonic(
            num_objects in 1usize..5,
            period in 1u32..4,
            time_max in 1u32..30,
        ) {
            let (trace, _counts, _log) = run_fleet(num_objects, period as SimTime, time_max as SimTime);
            prop_assert!(trace.windows(2).all(|w| w[0] <= w[1]));
        }

        /// Invariant: every object's own clock, as observed at the start of
        /// each of its own handler calls, is monotonically non-decreasing.
        #[test]
        fn object_clocks_are_monotonic(
            num_objects in 1usize..5,
            period in 1u32..4,
            time_max in 1u32..30,
        ) {
            let (_trace, _counts, log) = run_fleet(num_objects, period as SimTime, time_max as SimTime);
            let mut last_seen: std::collections::HashMap<String, SimTime> = std::collections::HashMap::new();
            for (name, time) in log {
                if let Some(&prev) = last_seen.get(&name) {
                    prop_assert!(time >= prev, "'{}' time regressed from {} to {}", name, prev, time);
                }
                last_seen.insert(name, time);
            }
        }

        /// Invariant: resetting an engine and re-running the identical
        /// recipe from scratch reproduces the original run exactly.
        #[test]
        fn reset_then_rebuild_reproduces_original_run(
            num_objects in 1usize..5,
            period in 1u32..4,
            time_max in 1u32..30,
        ) {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut engine = build_fleet(num_objects, period as SimTime, log.clone());
            engine.initialize().unwrap();
            let batches_first = engine.simulate(time_max as SimTime, SimulateOptions::default()).unwrap();
            let counts_first = engine.provide_event_counts();

            engine.reset();
            prop_assert_eq!(engine.state(), EngineState::Empty);

            log.lock().unwrap().clear();
            for i in 0..num_objects {
                engine
                    .add_object(Box::new(Pulser::new(format!("p{i}"), period as SimTime, log.clone())))
                    .unwrap();
            }
            engine.initialize().unwrap();
            let batches_second = engine.simulate(time_max as SimTime, SimulateOptions::default()).unwrap();
            let counts_second = engine.provide_event_counts();

            prop_assert_eq!(batches_first, batches_second);
            prop_assert_eq!(counts_first, counts_second);
        }
    }

    #[test]
    fn engine_level_causality_violation_aborts_the_run() {
        // The engine's own causality guard (core design §4.6 step 5) fires
        // when the next popped event's delivery_time is behind the
        // receiver's already-advanced clock. `send_event`'s delay >= 0
        // guarantee makes this unreachable through the public object API,
        // so this test drives the engine's private `run_loop` directly
        // with an object whose `time()` is seeded ahead of its own first
        // pending event.
        struct StaleClock {
            table: HandlerTable,
        }

        impl SimulationObject for StaleClock {
            fn name(&self) -> &str {
                "stale"
            }
            fn time(&self) -> SimTime {
                10.0
            }
            fn set_time(&mut self, _time: SimTime) {}
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
                _events: &EventList,
                _context: &mut SimulationContext,
            ) -> Result<(), EngineError> {
                Ok(())
            }
        }

        let mut engine = SimulationEngine::new(Vec::new(), None);
        engine
            .add_object(Box::new(StaleClock { table: HandlerTable::new() }))
            .unwrap();
        // Seed the queue with an event behind `stale`'s reported time()
        // directly through the crate-private event queue, modeling an
        // adversarial scheduler bypassing `SimulationContext`.
        engine
            .event_queue
            .schedule(0.0, 1.0, "outside".to_string(), "stale".to_string(), Box::new(Pulse), 0)
            .unwrap();
        engine.state = EngineState::Initialized;

        let err = engine.simulate(100.0, SimulateOptions::default()).unwrap_err();
        assert!(matches!(err.source, EngineError::CausalityViolation(_)));
    }
}
