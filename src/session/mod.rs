//! Profiling sessions
//!
//! A session is one armed measurement window: a [`SessionType`] deciding
//! how reports are emitted, a [`Window`] of cycles, and an optional filter
//! restricting measurement to the dynamic extent of one function.
//!
//! ```text
//! Uninitialized --arm--> Armed --(cycle = enabled_tick)--> Active
//!                                 --(cycle > disable_tick)--> Lapsed
//! ```
//!
//! `reset` returns to Uninitialized; re-arming from any state discards the
//! previous statistics.

mod context;
mod controller;

pub use context::{ExecutionContext, ROOT_CALLER};
pub use controller::SessionController;
pub(crate) use controller::Frame;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::recorder::CallRecord;

/// How a session reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Print a report at the end of every active cycle
    Stream,
    /// Notify once, at the last cycle of the window
    Email,
    /// Print once, at the last cycle of the window
    Profile,
    /// Accumulate silently for on-demand reports
    Background,
    /// Accumulate silently for call-graph export
    Callgrind,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionType::Stream => "stream",
            SessionType::Email => "email",
            SessionType::Profile => "profile",
            SessionType::Background => "background",
            SessionType::Callgrind => "callgrind",
        };
        f.write_str(name)
    }
}

/// Number of cycles a session stays active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Ticks(u64),
    Unbounded,
}

/// Everything a session accumulates; this is what the state store persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub map: BTreeMap<String, CallRecord>,
    /// Cost of every active cycle, summed
    pub total_time: f64,
    /// Cost consumed before the profiled callback, summed over active cycles
    pub init_time: f64,
    /// Cost recorded by profiled calls so far
    pub time_spend: f64,
    pub enabled_tick: u64,
    pub disable_tick: Option<u64>,
    #[serde(rename = "type")]
    pub kind: SessionType,
    pub filter: Option<String>,
    pub last_total: f64,
    pub last_sum: f64,
    pub last_init: f64,
}

impl SessionState {
    /// Fresh state for a session armed during cycle `current`
    ///
    /// Measurement starts on the following cycle so the cycle issuing the
    /// command is not itself measured.
    pub fn new(kind: SessionType, window: Window, filter: Option<String>, current: u64) -> Self {
        let disable_tick = match window {
            Window::Ticks(ticks) => Some(current.saturating_add(ticks.max(1))),
            Window::Unbounded => None,
        };
        Self {
            map: BTreeMap::new(),
            total_time: 0.0,
            init_time: 0.0,
            time_spend: 0.0,
            enabled_tick: current.saturating_add(1),
            disable_tick,
            kind,
            filter,
            last_total: 0.0,
            last_sum: 0.0,
            last_init: 0.0,
        }
    }

    /// Length of the window this session was armed with
    pub fn window(&self) -> Window {
        match self.disable_tick {
            Some(disable) => Window::Ticks(disable.saturating_sub(self.enabled_tick).saturating_add(1)),
            None => Window::Unbounded,
        }
    }

    pub fn in_window(&self, cycle: u64) -> bool {
        cycle >= self.enabled_tick && self.disable_tick.map_or(true, |end| cycle <= end)
    }

    /// Active cycles elapsed by `cycle`, at least one
    pub fn elapsed_ticks(&self, cycle: u64) -> u64 {
        let last = self.disable_tick.map_or(cycle, |end| cycle.min(end));
        last.saturating_add(1).saturating_sub(self.enabled_tick).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defers_activation_one_cycle() {
        let state = SessionState::new(SessionType::Profile, Window::Ticks(10), None, 50);
        assert_eq!(state.enabled_tick, 51);
        assert_eq!(state.disable_tick, Some(60));
        assert!(!state.in_window(50));
        assert!(state.in_window(51));
        assert!(state.in_window(60));
        assert!(!state.in_window(61));
    }

    #[test]
    fn test_unbounded_window() {
        let state = SessionState::new(SessionType::Background, Window::Unbounded, None, 0);
        assert_eq!(state.disable_tick, None);
        assert!(state.in_window(1_000_000));
        assert_eq!(state.window(), Window::Unbounded);
    }

    #[test]
    fn test_zero_ticks_keeps_invariant() {
        let state = SessionState::new(SessionType::Stream, Window::Ticks(0), None, 5);
        assert!(state.disable_tick.unwrap() >= state.enabled_tick);
    }

    #[test]
    fn test_window_recovers_original_length() {
        let state = SessionState::new(SessionType::Email, Window::Ticks(25), None, 100);
        assert_eq!(state.window(), Window::Ticks(25));
    }

    #[test]
    fn test_elapsed_ticks() {
        let state = SessionState::new(SessionType::Profile, Window::Ticks(10), None, 10);
        assert_eq!(state.elapsed_ticks(10), 1);
        assert_eq!(state.elapsed_ticks(11), 1);
        assert_eq!(state.elapsed_ticks(15), 5);
        assert_eq!(state.elapsed_ticks(40), 10);
    }

    #[test]
    fn test_serialized_field_names() {
        let state = SessionState::new(SessionType::Callgrind, Window::Ticks(3), Some("run".into()), 1);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["type"], "callgrind");
        assert_eq!(json["enabledTick"], 2);
        assert_eq!(json["disableTick"], 4);
        assert_eq!(json["filter"], "run");
        assert!(json.get("timeSpend").is_some());
    }

    #[test]
    fn test_session_type_display() {
        assert_eq!(SessionType::Background.to_string(), "background");
    }
}
