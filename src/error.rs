//! Error types for the profiler
//!
//! Wrapping and registration failures surface immediately to the caller.
//! Failures raised by the *profiled* functions are not represented here:
//! they travel through untouched as [`crate::host::Thrown`].

use thiserror::Error;

/// Errors raised by profiler operations
#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("function '{name}' is already profiled and cannot be wrapped twice")]
    DoubleWrap { name: String },

    #[error("cannot register a {found} value: expected an object or a class")]
    InvalidTarget { found: &'static str },

    #[error("no display name could be derived for an anonymous function")]
    MissingName,

    #[error("invalid profiler configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid session state document: {0}")]
    StateFormat(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for profiler operations
pub type Result<T> = std::result::Result<T, ProfilerError>;
