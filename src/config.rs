//! Profiler configuration
//!
//! Loaded from TOML; every field has a default so a partial file (or no
//! file at all) is valid.
//!
//! ```toml
//! skip_members = ["constructor", "getUsed", "toJSON"]
//!
//! [sessions]
//! stream_ticks = 5
//!
//! [report]
//! max_lines = 40
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Default window lengths, in cycles, for each session command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    pub stream_ticks: u64,
    pub email_ticks: u64,
    pub profile_ticks: u64,
    pub callgrind_ticks: u64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            stream_ticks: 10,
            email_ticks: 100,
            profile_ticks: 100,
            callgrind_ticks: 100,
        }
    }
}

/// Default bounds of the tabular report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDefaults {
    /// Function entries shown
    pub max_lines: usize,
    /// Character budget for the whole report
    pub max_chars: usize,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            max_lines: 20,
            max_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    pub sessions: SessionDefaults,
    pub report: ReportDefaults,
    /// Member names the enumerator never wraps
    pub skip_members: Vec<String>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            sessions: SessionDefaults::default(),
            report: ReportDefaults::default(),
            // Constructors need `new` semantics; the cost query would measure itself.
            skip_members: vec!["constructor".to_string(), "getUsed".to_string()],
        }
    }
}

impl ProfilerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn skips(&self, member: &str) -> bool {
        self.skip_members.iter().any(|name| name == member)
    }
}
