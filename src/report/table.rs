//! Tabular report
//!
//! ```text
//! calls		time		avg		max		function
//! 12		30.5		2.542		4.100		Creep.moveTo
//! 3		2.0		0.667		1.000		Room.find
//! 2		1.5		0.750		1.000		  by Creep.moveTo
//! 1		0.5		0.500		0.500		  by root
//! Avg: 3.20	Sum: 32.50 +32.50	Init: 0.40 +0.40	Total: 35.20 +35.20	Ticks: 11
//! ```

use super::{stats, FunctionStats, ReportOptions, NOT_ACTIVE};
use crate::recorder::sum_costs;
use crate::session::SessionState;

pub const HEADER: &str = "calls\t\ttime\t\tavg\t\tmax\t\tfunction";

/// Render the digest and move the since-last-report snapshots forward
pub fn render(state: Option<&mut SessionState>, cycle: u64, options: &ReportOptions) -> String {
    let Some(state) = state else {
        return NOT_ACTIVE.to_string();
    };

    let elapsed = state.elapsed_ticks(cycle);
    let stats = stats(&state.map);
    let time_sum = sum_costs(stats.iter().map(|s| s.total_time));
    let footer = [
        format!("Avg: {:.2}", state.total_time / elapsed as f64),
        format!("Sum: {:.2} +{:.2}", time_sum, time_sum - state.last_sum),
        format!(
            "Init: {:.2} +{:.2}",
            state.init_time,
            state.init_time - state.last_init
        ),
        format!(
            "Total: {:.2} +{:.2}",
            state.total_time,
            state.total_time - state.last_total
        ),
        format!("Ticks: {}", elapsed),
    ]
    .join("\t");

    state.last_total = state.total_time;
    state.last_sum = time_sum;
    state.last_init = state.init_time;

    let entries = stats
        .iter()
        .take(options.max_lines)
        .map(|entry| entry_block(entry, 0));
    assemble(entries, &footer, options.max_chars)
}

/// One entry plus its caller breakdown, each nested level indented two spaces
fn entry_block(entry: &FunctionStats, depth: usize) -> String {
    let mut block = format!(
        "{}\t\t{:.1}\t\t{:.3}\t\t{:.3}\t\t{}{}",
        entry.calls,
        entry.total_time,
        entry.average_time,
        entry.max_time,
        "  ".repeat(depth),
        entry.name
    );
    for sub in entry.sub_stats.iter().flatten() {
        block.push('\n');
        block.push_str(&entry_block(sub, depth + 1));
    }
    block
}

/// Join header, entries and footer without exceeding `budget` bytes
///
/// Entries that do not fit are dropped from the bottom, whole.
fn assemble(entries: impl Iterator<Item = String>, footer: &str, budget: Option<usize>) -> String {
    let mut length = HEADER.len() + 1 + footer.len();
    if budget.is_some_and(|limit| length > limit) {
        return match budget {
            Some(limit) if footer.len() <= limit => footer.to_string(),
            _ => String::new(),
        };
    }

    let mut out = String::from(HEADER);
    for entry in entries {
        if budget.is_some_and(|limit| length + entry.len() + 1 > limit) {
            break;
        }
        length += entry.len() + 1;
        out.push('\n');
        out.push_str(&entry);
    }
    out.push('\n');
    out.push_str(footer);
    out
}
