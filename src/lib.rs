//! Error diagnostics for judge sandbox output
//!
//! `parser` classifies raw stdout/stderr from the execution sandbox into a
//! structured `ParsedError` and renders it for display. The remaining
//! modules wrap it in a Redis queue worker.

pub mod config;
pub mod error;
pub mod jobs;
pub mod languages;
pub mod parser;
pub mod redis_manager;
pub mod verdict;

pub use error::DiagnoseError;
pub use parser::{
    clean_error_message, format_error_output, is_runtime_error, is_syntax_error,
    looks_like_error, parse_code_error, parse_code_error_with, ErrorCategory, ExecutionPhase,
    LineMapping, ParseOptions, ParsedError, Verbosity,
};
pub use verdict::{TestResult, Verdict};
