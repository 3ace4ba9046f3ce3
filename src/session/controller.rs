//! Session state machine and per-call accounting

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

use super::{ExecutionContext, SessionState, SessionType, Window};
use crate::clock::{CostClock, CycleClock};
use crate::config::ProfilerConfig;
use crate::error::Result;
use crate::report::{self, ReportOptions};
use crate::sink::ReportSink;
use crate::store::StateStore;

/// Bookkeeping for one in-flight profiled call
#[derive(Debug)]
pub(crate) struct Frame {
    name: String,
    start: f64,
    initial_spend: f64,
    previous: String,
    matches_filter: bool,
    generation: u64,
}

impl Frame {
    /// Put the caller this frame replaced back in place
    pub(crate) fn restore_caller(self, context: &mut ExecutionContext) {
        context.leave(self.previous, self.matches_filter);
    }
}

/// Owns the session state slot and decides, per cycle, whether calls are
/// measured and when reports go out
pub struct SessionController {
    enabled: bool,
    config: ProfilerConfig,
    cost: Box<dyn CostClock>,
    cycles: Box<dyn CycleClock>,
    store: Box<dyn StateStore>,
    context: Rc<RefCell<ExecutionContext>>,
    // Bumped whenever the session slot is replaced or cleared
    generation: u64,
    console: Box<dyn ReportSink>,
    notifier: Box<dyn ReportSink>,
}

impl SessionController {
    pub fn new(
        config: ProfilerConfig,
        cost: Box<dyn CostClock>,
        cycles: Box<dyn CycleClock>,
        store: Box<dyn StateStore>,
        console: Box<dyn ReportSink>,
        notifier: Box<dyn ReportSink>,
    ) -> Self {
        Self {
            enabled: false,
            config,
            cost,
            cycles,
            store,
            context: Rc::new(RefCell::new(ExecutionContext::new())),
            generation: 0,
            console,
            notifier,
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn context(&self) -> Ref<'_, ExecutionContext> {
        self.context.borrow()
    }

    /// Shared handle so a frame can restore its caller without the controller
    pub(crate) fn context_handle(&self) -> Rc<RefCell<ExecutionContext>> {
        Rc::clone(&self.context)
    }

    pub fn current_cycle(&self) -> u64 {
        self.cycles.current()
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.store.slot()
    }

    pub fn state_mut(&mut self) -> Option<&mut SessionState> {
        self.store.slot_mut().as_mut()
    }

    /// Start a new session, discarding any previous statistics
    pub fn arm(&mut self, kind: SessionType, window: Window, filter: Option<&str>) {
        let current = self.cycles.current();
        let state = SessionState::new(kind, window, filter.map(str::to_string), current);
        debug!(
            session = %kind,
            enabled_tick = state.enabled_tick,
            disable_tick = ?state.disable_tick,
            filter = ?state.filter,
            "profiler session armed"
        );
        *self.store.slot_mut() = Some(state);
        self.generation = self.generation.wrapping_add(1);
        self.flush();
    }

    /// Arm `kind` for `ticks` cycles, falling back to the configured default
    pub fn command(&mut self, kind: SessionType, ticks: Option<u64>, filter: Option<&str>) {
        let defaults = &self.config.sessions;
        let window = match kind {
            SessionType::Background => Window::Unbounded,
            SessionType::Stream => Window::Ticks(ticks.unwrap_or(defaults.stream_ticks)),
            SessionType::Email => Window::Ticks(ticks.unwrap_or(defaults.email_ticks)),
            SessionType::Profile => Window::Ticks(ticks.unwrap_or(defaults.profile_ticks)),
            SessionType::Callgrind => Window::Ticks(ticks.unwrap_or(defaults.callgrind_ticks)),
        };
        self.arm(kind, window, filter);
    }

    /// Re-arm the running session with its original type, window and filter
    ///
    /// Returns `false` (and does nothing) unless a session is active.
    pub fn restart(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(state) = self.store.slot() else {
            return false;
        };
        let (kind, window, filter) = (state.kind, state.window(), state.filter.clone());
        debug!(session = %kind, "profiler session restarted");
        self.arm(kind, window, filter.as_deref());
        true
    }

    pub fn reset(&mut self) {
        debug!("profiler session reset");
        *self.store.slot_mut() = None;
        self.generation = self.generation.wrapping_add(1);
        self.flush();
    }

    pub fn is_active(&self) -> bool {
        if !self.enabled {
            return false;
        }
        self.store
            .slot()
            .is_some_and(|state| state.in_window(self.cycles.current()))
    }

    /// Prepare a new cycle; returns whether it is measured
    ///
    /// The call stack never leaks across cycles, so the execution context
    /// resets here whether or not a session is running. Init cost is read
    /// after the cost clock's cycle hook, see [`crate::clock::WallClock`].
    pub fn begin_cycle(&mut self) -> bool {
        self.context.borrow_mut().reset();
        self.cost.cycle_started();
        if !self.is_active() {
            return false;
        }
        let init = self.cost.now();
        if let Some(state) = self.state_mut() {
            state.init_time += init;
        }
        true
    }

    /// Close a measured cycle: add its cost to the totals and emit reports
    pub fn end_cycle(&mut self) {
        let cycle = self.cycles.current();
        let used = self.cost.now();
        let Some(state) = self.store.slot_mut().as_mut() else {
            return;
        };
        if cycle < state.enabled_tick {
            return;
        }
        state.total_time += used;

        let kind = state.kind;
        let on_last_tick = state.disable_tick == Some(cycle);
        match kind {
            SessionType::Stream => self.print(),
            SessionType::Profile if on_last_tick => self.print(),
            SessionType::Email if on_last_tick => {
                let options = self.default_report_options();
                let text = self.output(&options);
                self.notifier.deliver(&text);
            }
            _ => {}
        }
        self.flush();
    }

    fn print(&mut self) {
        let options = self.default_report_options();
        let text = self.output(&options);
        self.console.deliver(&text);
    }

    pub fn default_report_options(&self) -> ReportOptions {
        ReportOptions::from(&self.config.report)
    }

    /// Tabular report; updates the since-last-report snapshots
    pub fn output(&mut self, options: &ReportOptions) -> String {
        let cycle = self.cycles.current();
        report::table::render(self.store.slot_mut().as_mut(), cycle, options)
    }

    pub fn callgrind(&self) -> String {
        report::callgrind::render(self.store.slot(), self.cycles.current())
    }

    pub fn json(&self) -> Result<String> {
        report::json::render(self.store.slot(), self.cycles.current())
    }

    /// Open the accounting frame for a call to `name`, if measuring
    pub(crate) fn open_frame(&mut self, name: &str) -> Option<Frame> {
        if !self.is_active() {
            return None;
        }
        let state = self.store.slot()?;
        let matches_filter = state.filter.as_deref() == Some(name);
        let initial_spend = state.time_spend;
        let start = self.cost.now();
        let previous = self.context.borrow_mut().enter(name, matches_filter);
        Some(Frame {
            name: name.to_string(),
            start,
            initial_spend,
            previous,
            matches_filter,
            generation: self.generation,
        })
    }

    /// Record the call described by `frame` and restore its caller
    ///
    /// Cost already recorded by nested profiled calls during the frame is
    /// subtracted from its elapsed cost. This assumes profiler overhead is
    /// additive; with coarse clocks the result can go negative. A frame
    /// opened before the session was re-armed or reset records nothing.
    pub(crate) fn close_frame(&mut self, frame: Frame) {
        let end = self.cost.now();
        let depth = self.context.borrow().depth();
        if frame.generation != self.generation {
            debug!(function = %frame.name, "session replaced during call, measurement dropped");
        } else if let Some(state) = self.store.slot_mut().as_mut() {
            if depth > 0 || state.filter.is_none() {
                let nested = state.time_spend - frame.initial_spend;
                let cost = (end - frame.start) - nested;
                state.record(Some(&frame.previous), &frame.name, cost);
            }
        }
        frame.restore_caller(&mut self.context.borrow_mut());
    }

    fn flush(&mut self) {
        if let Err(e) = self.store.flush() {
            warn!("Failed to persist profiler state: {}", e);
        }
    }
}
