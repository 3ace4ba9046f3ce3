//! JSON report

use serde::Serialize;

use super::{stats, FunctionStats};
use crate::error::Result;
use crate::recorder::sum_costs;
use crate::session::{SessionState, SessionType};

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub session: SessionType,
    pub enabled_tick: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_tick: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    pub ticks: u64,
    pub total_time: f64,
    pub init_time: f64,
    pub sum_time: f64,
    pub functions: Vec<FunctionStats>,
}

impl<'a> JsonReport<'a> {
    pub fn new(state: &'a SessionState, cycle: u64) -> Self {
        let functions = stats(&state.map);
        let sum_time = sum_costs(functions.iter().map(|f| f.total_time));
        Self {
            session: state.kind,
            enabled_tick: state.enabled_tick,
            disable_tick: state.disable_tick,
            filter: state.filter.as_deref(),
            ticks: state.elapsed_ticks(cycle),
            total_time: state.total_time,
            init_time: state.init_time,
            sum_time,
            functions,
        }
    }
}

/// Pretty-printed report, or `null` when no session exists
pub fn render(state: Option<&SessionState>, cycle: u64) -> Result<String> {
    let report = state.map(|state| JsonReport::new(state, cycle));
    Ok(serde_json::to_string_pretty(&report)?)
}
