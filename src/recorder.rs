//! Call-tree recording
//!
//! Each timed invocation lands here as `(caller, callee, cost)`. The callee
//! gets one aggregate record, and inside it one breakdown entry per direct
//! caller. There is exactly one level of caller attribution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::SessionState;

/// Sum of `costs`, `0.0` when empty
///
/// `Iterator::sum` over `f64` starts from `-0.0`, which would print as
/// `-0.00` in an empty report.
pub(crate) fn sum_costs(costs: impl IntoIterator<Item = f64>) -> f64 {
    costs.into_iter().fold(0.0, |acc, cost| acc + cost)
}

/// Per-caller slice of a function's calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallerRecord {
    pub calls: u64,
    pub durations: Vec<f64>,
}

impl CallerRecord {
    fn push(&mut self, cost: f64) {
        self.calls += 1;
        self.durations.push(cost);
    }

    pub fn total_time(&self) -> f64 {
        sum_costs(self.durations.iter().copied())
    }
}

/// Aggregate statistics for one function
///
/// `calls` always equals `durations.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub calls: u64,
    pub durations: Vec<f64>,
    /// Breakdown keyed by the direct caller's display name
    #[serde(default)]
    pub callers: BTreeMap<String, CallerRecord>,
}

impl CallRecord {
    pub fn total_time(&self) -> f64 {
        sum_costs(self.durations.iter().copied())
    }

    /// Breakdown entry for `caller`, if that caller was ever seen
    pub fn by_caller(&self, caller: &str) -> Option<&CallerRecord> {
        self.callers.get(caller)
    }
}

impl SessionState {
    /// Record one completed invocation of `callee`
    ///
    /// Negative costs (clock skew) are kept as measured.
    pub fn record(&mut self, caller: Option<&str>, callee: &str, cost: f64) {
        let entry = self.map.entry(callee.to_string()).or_default();
        entry.calls += 1;
        entry.durations.push(cost);
        self.time_spend += cost;

        if let Some(caller) = caller {
            entry
                .callers
                .entry(caller.to_string())
                .or_default()
                .push(cost);
        }
    }
}
