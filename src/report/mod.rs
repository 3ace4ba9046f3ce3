//! Report rendering
//!
//! All renderers work from the same [`stats`] view of a session's call
//! map:
//! - `table`: tab-separated digest with a totals footer
//! - `callgrind`: call-graph exchange format for external visualizers
//! - `json`: machine-readable stats document

pub mod callgrind;
pub mod json;
pub mod table;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::ReportDefaults;
use crate::recorder::{sum_costs, CallRecord};

/// Returned by every renderer when no session has been armed
pub const NOT_ACTIVE: &str = "Profiler not active.";

/// Bounds applied to the tabular report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Function entries shown, hottest first
    pub max_lines: usize,
    /// Upper bound on the report's length in bytes
    pub max_chars: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&ReportDefaults::default())
    }
}

impl From<&ReportDefaults> for ReportOptions {
    fn from(defaults: &ReportDefaults) -> Self {
        Self {
            max_lines: defaults.max_lines,
            max_chars: Some(defaults.max_chars),
        }
    }
}

/// Summary of one function, or of one caller slice of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionStats {
    pub name: String,
    pub calls: u64,
    pub total_time: f64,
    pub average_time: f64,
    pub max_time: f64,
    /// Per-caller breakdown, present only with two or more callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stats: Option<Vec<FunctionStats>>,
}

impl FunctionStats {
    fn summarize(name: String, calls: u64, durations: &[f64]) -> Self {
        let total_time = sum_costs(durations.iter().copied());
        let average_time = if calls > 0 {
            total_time / calls as f64
        } else {
            0.0
        };
        let max_time = durations
            .iter()
            .copied()
            .fold(None, |max: Option<f64>, d| Some(max.map_or(d, |m| m.max(d))))
            .unwrap_or(0.0);
        Self {
            name,
            calls,
            total_time,
            average_time,
            max_time,
            sub_stats: None,
        }
    }
}

/// Per-function summaries sorted by total time, hottest first
pub fn stats(map: &BTreeMap<String, CallRecord>) -> Vec<FunctionStats> {
    let mut stats: Vec<FunctionStats> = map
        .iter()
        .map(|(name, record)| {
            let mut entry = FunctionStats::summarize(name.clone(), record.calls, &record.durations);
            // A single caller repeats the parent line; only show real breakdowns.
            if record.callers.len() >= 2 {
                let mut subs: Vec<FunctionStats> = record
                    .callers
                    .iter()
                    .map(|(caller, slice)| {
                        FunctionStats::summarize(format!("by {caller}"), slice.calls, &slice.durations)
                    })
                    .collect();
                sort_by_total(&mut subs);
                entry.sub_stats = Some(subs);
            }
            entry
        })
        .collect();
    sort_by_total(&mut stats);
    stats
}

fn sort_by_total(stats: &mut [FunctionStats]) {
    stats.sort_by(|a, b| b.total_time.total_cmp(&a.total_time));
}
