//! Call-graph exchange format (callgrind)
//!
//! Every function gets a `fn=` block with its self cost, followed by one
//! `cfn=` call entry per function it called directly, costed with the
//! callee's self time under that caller. Costs are exported
//! as integer nanoseconds, assuming the cost clock counts milliseconds.
//! Callers that were never profiled themselves, such as `root`, get a
//! block too so the graph stays connected.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use super::NOT_ACTIVE;
use crate::recorder::CallerRecord;
use crate::session::SessionState;

fn to_ns(cost: f64) -> i64 {
    (cost * 1_000_000.0).round() as i64
}

pub fn render(state: Option<&SessionState>, cycle: u64) -> String {
    let Some(state) = state else {
        return NOT_ACTIVE.to_string();
    };

    // Invert the per-callee caller breakdown into caller -> callees.
    let mut callees: BTreeMap<&str, BTreeMap<&str, &CallerRecord>> = BTreeMap::new();
    for (callee, record) in &state.map {
        for (caller, slice) in &record.callers {
            callees
                .entry(caller.as_str())
                .or_default()
                .insert(callee.as_str(), slice);
        }
    }

    let names: BTreeSet<&str> = state
        .map
        .keys()
        .map(String::as_str)
        .chain(callees.keys().copied())
        .collect();

    let mut body = String::new();
    let _ = writeln!(body, "# callgrind format");
    let _ = writeln!(body, "version: 1");
    let _ = writeln!(body, "creator: tickprof");
    let _ = writeln!(body, "desc: Ticks: {}", state.elapsed_ticks(cycle));
    let _ = writeln!(body, "events: ns");
    let _ = writeln!(body, "summary: {}", to_ns(state.total_time));

    for name in names {
        // Recorded durations already exclude profiled callees.
        let self_cost = state.map.get(name).map_or(0.0, |record| record.total_time());
        let _ = write!(body, "\nfn={}\n1 {}\n", name, to_ns(self_cost));
        for (callee, slice) in callees.get(name).into_iter().flatten() {
            let _ = write!(
                body,
                "cfn={}\ncalls={} 1\n1 {}\n",
                callee,
                slice.calls,
                to_ns(slice.total_time())
            );
        }
    }
    body
}
