//! Public profiler handle
//!
//! # Example
//! ```
//! use tickprof::clock::{ManualClock, ManualCycle};
//! use tickprof::host::{Function, Value};
//! use tickprof::Profiler;
//!
//! let cycle = ManualCycle::new(1);
//! let profiler = Profiler::builder(cycle.clone())
//!     .cost_clock(ManualClock::new())
//!     .build();
//! profiler.enable();
//!
//! let step = Function::native("step", |_, _| Ok(Value::Undefined));
//! let step = profiler.register_function(&step, None).unwrap();
//!
//! profiler.background(None);
//! cycle.tick();
//! profiler.wrap_cycle(|| step.call(&Value::Undefined, &[]).unwrap());
//!
//! assert!(profiler.output(None).contains("step"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::clock::{CostClock, CycleClock, WallClock};
use crate::config::ProfilerConfig;
use crate::enumerator;
use crate::error::Result;
use crate::host::{Function, Value};
use crate::report::ReportOptions;
use crate::session::{SessionController, SessionState, SessionType};
use crate::sink::{ReportSink, StderrSink, TracingSink};
use crate::store::{MemoryStore, StateStore};
use crate::wrapper::{self, CallGuard};

/// Configures the collaborators a [`Profiler`] runs against
pub struct ProfilerBuilder {
    config: ProfilerConfig,
    cycles: Box<dyn CycleClock>,
    cost: Box<dyn CostClock>,
    store: Box<dyn StateStore>,
    console: Box<dyn ReportSink>,
    notifier: Box<dyn ReportSink>,
    namespaces: Vec<(String, Value)>,
}

impl ProfilerBuilder {
    pub fn config(mut self, config: ProfilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cost_clock(mut self, clock: impl CostClock + 'static) -> Self {
        self.cost = Box::new(clock);
        self
    }

    pub fn store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Destination of `stream` and `profile` reports (default: stderr)
    pub fn console(mut self, sink: impl ReportSink + 'static) -> Self {
        self.console = Box::new(sink);
        self
    }

    /// Destination of `email` reports (default: `tracing` events)
    pub fn notifier(mut self, sink: impl ReportSink + 'static) -> Self {
        self.notifier = Box::new(sink);
        self
    }

    /// Namespace whose members are instrumented by [`Profiler::enable`]
    pub fn namespace(mut self, label: impl Into<String>, target: impl Into<Value>) -> Self {
        self.namespaces.push((label.into(), target.into()));
        self
    }

    pub fn build(self) -> Profiler {
        let controller = SessionController::new(
            self.config,
            self.cost,
            self.cycles,
            self.store,
            self.console,
            self.notifier,
        );
        Profiler {
            controller: Rc::new(RefCell::new(controller)),
            namespaces: Rc::from(self.namespaces),
        }
    }
}

/// Shared, single-threaded handle to one profiler instance
///
/// Clones refer to the same session. Proxies keep a handle of their own,
/// so they stay usable for as long as they live. Report sinks and the
/// callback given to [`Profiler::with_state`] must not call back into
/// the profiler.
#[derive(Clone)]
pub struct Profiler {
    controller: Rc<RefCell<SessionController>>,
    namespaces: Rc<[(String, Value)]>,
}

impl Profiler {
    /// Start configuring a profiler driven by `cycles`
    pub fn builder(cycles: impl CycleClock + 'static) -> ProfilerBuilder {
        ProfilerBuilder {
            config: ProfilerConfig::default(),
            cycles: Box::new(cycles),
            cost: Box::new(WallClock::new()),
            store: Box::new(MemoryStore::new()),
            console: Box::new(StderrSink),
            notifier: Box::new(TracingSink),
            namespaces: Vec::new(),
        }
    }

    pub(crate) fn controller(&self) -> &Rc<RefCell<SessionController>> {
        &self.controller
    }

    pub fn config(&self) -> ProfilerConfig {
        self.controller.borrow().config().clone()
    }

    /// Turn measurement on and instrument the builder's namespaces
    pub fn enable(&self) {
        self.controller.borrow_mut().enable();
        for (label, target) in self.namespaces.iter() {
            match enumerator::register_object(self, target, Some(label.as_str())) {
                Ok(_) => debug!(namespace = %label, "namespace instrumented"),
                Err(e) => warn!("Failed to instrument namespace {}: {}", label, e),
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.controller.borrow().is_enabled()
    }

    pub fn is_active(&self) -> bool {
        self.controller.borrow().is_active()
    }

    /// Run one execution cycle under the profiler
    pub fn wrap_cycle<R>(&self, callback: impl FnOnce() -> R) -> R {
        let measured = self.controller.borrow_mut().begin_cycle();
        let result = callback();
        if measured {
            self.controller.borrow_mut().end_cycle();
        }
        result
    }

    /// Wrap a single host function; see [`wrapper::wrap`]
    pub fn register_function(&self, function: &Function, name: Option<&str>) -> Result<Function> {
        wrapper::wrap(self, function, name)
    }

    /// Instrument every callable member of an object, in place
    pub fn register_object(&self, target: &Value, label: Option<&str>) -> Result<Value> {
        enumerator::register_object(self, target, label)
    }

    /// Instrument a class's prototype and static members, in place
    pub fn register_class(&self, target: &Value, label: Option<&str>) -> Result<Value> {
        enumerator::register_class(self, target, label)
    }

    /// Measure a native closure as if it were a profiled function named `name`
    pub fn measure<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let _guard = CallGuard::open(&self.controller, name);
        f()
    }

    /// Tabular report; `limit` overrides the configured character budget
    pub fn output(&self, limit: Option<usize>) -> String {
        let mut controller = self.controller.borrow_mut();
        let mut options = controller.default_report_options();
        if let Some(limit) = limit {
            options.max_chars = Some(limit);
        }
        controller.output(&options)
    }

    pub fn output_with(&self, options: &ReportOptions) -> String {
        self.controller.borrow_mut().output(options)
    }

    pub fn callgrind_output(&self) -> String {
        self.controller.borrow().callgrind()
    }

    pub fn json_output(&self) -> Result<String> {
        self.controller.borrow().json()
    }

    pub fn stream(&self, ticks: Option<u64>, filter: Option<&str>) {
        self.command(SessionType::Stream, ticks, filter);
    }

    pub fn email(&self, ticks: Option<u64>, filter: Option<&str>) {
        self.command(SessionType::Email, ticks, filter);
    }

    pub fn profile(&self, ticks: Option<u64>, filter: Option<&str>) {
        self.command(SessionType::Profile, ticks, filter);
    }

    pub fn callgrind(&self, ticks: Option<u64>, filter: Option<&str>) {
        self.command(SessionType::Callgrind, ticks, filter);
    }

    pub fn background(&self, filter: Option<&str>) {
        self.command(SessionType::Background, None, filter);
    }

    fn command(&self, kind: SessionType, ticks: Option<u64>, filter: Option<&str>) {
        self.controller.borrow_mut().command(kind, ticks, filter);
    }

    pub fn reset(&self) {
        self.controller.borrow_mut().reset();
    }

    /// Re-arm the active session; `false` if none is active
    pub fn restart(&self) -> bool {
        self.controller.borrow_mut().restart()
    }

    /// Inspect the current session state
    pub fn with_state<R>(&self, f: impl FnOnce(Option<&SessionState>) -> R) -> R {
        f(self.controller.borrow().state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, ManualCycle};
    use crate::host::Object;
    use crate::sink::MemorySink;

    fn setup() -> (Profiler, ManualClock, ManualCycle) {
        let clock = ManualClock::new();
        let cycle = ManualCycle::new(10);
        let profiler = Profiler::builder(cycle.clone())
            .cost_clock(clock.clone())
            .console(MemorySink::new())
            .build();
        (profiler, clock, cycle)
    }

    #[test]
    fn test_output_without_session() {
        let (profiler, _, _) = setup();
        assert_eq!(profiler.output(None), "Profiler not active.");
    }

    #[test]
    fn test_not_active_until_enabled() {
        let (profiler, _, cycle) = setup();
        profiler.background(None);
        cycle.tick();
        assert!(!profiler.is_active());
        profiler.enable();
        assert!(profiler.is_active());
    }

    #[test]
    fn test_measure_records_native_closure() {
        let (profiler, clock, cycle) = setup();
        profiler.enable();
        profiler.profile(None, None);
        cycle.tick();

        let value = profiler.measure("native.work", || {
            clock.advance(3.0);
            42
        });
        assert_eq!(value, 42);
        profiler.with_state(|state| {
            assert_eq!(state.unwrap().map["native.work"].durations, vec![3.0]);
        });
    }

    #[test]
    fn test_enable_instruments_namespaces() {
        let game = Object::new();
        game.insert("getObjectById", Function::native("getObjectById", |_, _| Ok(Value::Null)));
        let cycle = ManualCycle::new(0);
        let profiler = Profiler::builder(cycle).namespace("Game", game.clone()).build();

        profiler.enable();
        let member = game.get("getObjectById").unwrap();
        let identity = member.as_function().unwrap().identity().unwrap();
        assert_eq!(identity.display_name(), "Game.getObjectById");
    }

    #[test]
    fn test_wrap_cycle_returns_callback_value() {
        let (profiler, _, cycle) = setup();
        profiler.enable();
        assert_eq!(profiler.wrap_cycle(|| "inactive"), "inactive");
        profiler.background(None);
        cycle.tick();
        assert_eq!(profiler.wrap_cycle(|| "active"), "active");
    }

    #[test]
    fn test_output_limit_overrides_budget() {
        let (profiler, _, cycle) = setup();
        profiler.enable();
        profiler.profile(None, None);
        cycle.tick();
        for i in 0..100 {
            profiler.measure(&format!("fn{i}"), || ());
        }
        assert!(profiler.output(Some(200)).len() <= 200);
        assert!(profiler.output(None).len() <= 1000);
    }

    #[test]
    fn test_json_output() {
        let (profiler, _, _) = setup();
        assert_eq!(profiler.json_output().unwrap(), "null");
        profiler.stream(None, None);
        assert!(profiler.json_output().unwrap().contains("\"session\": \"stream\""));
    }
}
