//! Cost and cycle clocks
//!
//! The profiler never reads time directly: cost comes from a [`CostClock`]
//! and the current execution cycle from a [`CycleClock`]. Hosts with their
//! own accounting (CPU budgets, instruction counters, simulated time) plug
//! in here.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Cost consumed so far in the current cycle
pub trait CostClock {
    /// Current cost reading; must not decrease within a cycle
    fn now(&self) -> f64;

    /// Called once at the start of every profiled cycle
    fn cycle_started(&self) {}
}

/// Identifies the current execution cycle ("tick")
pub trait CycleClock {
    /// Current cycle number; never decreases within a run
    fn current(&self) -> u64;
}

/// Wall-clock cost in milliseconds since the start of the cycle
///
/// The origin moves when the profiler starts a cycle, before the cycle's
/// init cost is read. Time the host spent before [`Profiler::wrap_cycle`]
/// is therefore invisible, and the `Init:` report column stays close to
/// zero. Hosts that want a meaningful init figure should supply a clock
/// whose origin is the true start of the tick (e.g. a CPU budget counter).
///
/// [`Profiler::wrap_cycle`]: crate::Profiler::wrap_cycle
#[derive(Debug)]
pub struct WallClock {
    origin: Cell<Instant>,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Cell::new(Instant::now()),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CostClock for WallClock {
    fn now(&self) -> f64 {
        self.origin.get().elapsed().as_secs_f64() * 1000.0
    }

    fn cycle_started(&self) {
        self.origin.set(Instant::now());
    }
}

/// Cost clock driven by the host (or a test) through a shared handle
///
/// # Example
/// ```
/// use tickprof::clock::{CostClock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(2.5);
/// assert_eq!(clock.now(), 2.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, cost: f64) {
        self.0.set(cost);
    }

    pub fn advance(&self, cost: f64) {
        self.0.set(self.0.get() + cost);
    }
}

impl CostClock for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

/// Cycle counter driven by the host through a shared handle
#[derive(Debug, Clone, Default)]
pub struct ManualCycle(Rc<Cell<u64>>);

impl ManualCycle {
    pub fn new(start: u64) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, cycle: u64) {
        self.0.set(cycle);
    }

    /// Move to the next cycle
    pub fn tick(&self) {
        self.0.set(self.0.get() + 1);
    }
}

impl CycleClock for ManualCycle {
    fn current(&self) -> u64 {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wall_clock_measures_milliseconds() {
        let clock = WallClock::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = clock.now();
        assert!(elapsed >= 10.0);
        assert!(elapsed < 1000.0);
    }

    #[test]
    fn test_wall_clock_cycle_start_resets_origin() {
        let clock = WallClock::new();
        thread::sleep(Duration::from_millis(10));
        clock.cycle_started();
        assert!(clock.now() < 10.0);
    }

    #[test]
    fn test_manual_clock_shared_handle() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.set(4.0);
        handle.advance(1.5);
        assert_eq!(clock.now(), 5.5);
        clock.cycle_started();
        assert_eq!(clock.now(), 5.5);
    }

    #[test]
    fn test_manual_cycle_tick() {
        let cycle = ManualCycle::new(10);
        let handle = cycle.clone();
        handle.tick();
        assert_eq!(cycle.current(), 11);
        handle.set(42);
        assert_eq!(cycle.current(), 42);
    }
}
