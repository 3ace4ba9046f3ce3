//! Tickprof - call-tree profiler for tick-driven host runtimes
//!
//! This library wraps host functions in transparent timing proxies,
//! attributes each call's self cost to its caller, and windows measurement
//! to a range of execution cycles. Sessions report as a tab-separated
//! digest, a callgrind call graph, or JSON.
//!
//! The host object model lives in [`host`]; clocks, the persistence slot
//! and report delivery are traits so embedders supply their own.

pub mod cli;
pub mod clock;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod host;
pub mod profiler;
pub mod recorder;
pub mod report;
pub mod session;
pub mod sink;
pub mod store;
pub mod wrapper;

pub use error::{ProfilerError, Result};
pub use profiler::{Profiler, ProfilerBuilder};
pub use session::{SessionState, SessionType, Window};
