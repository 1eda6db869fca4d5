//! Classification result types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DiagnoseError;

/// Who is at fault and how the error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Syntax,
    Runtime,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Runtime => "runtime",
            ErrorCategory::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Stage of the run in which the error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    Parse,
    Execution,
    System,
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionPhase::Parse => "parse",
            ExecutionPhase::Execution => "execution",
            ExecutionPhase::System => "system",
        };
        write!(f, "{}", s)
    }
}

/// How much detail `format_error_output` renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Beginner,
    #[default]
    Standard,
    Advanced,
}

impl FromStr for Verbosity {
    type Err = DiagnoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Verbosity::Beginner),
            "standard" => Ok(Verbosity::Standard),
            "advanced" => Ok(Verbosity::Advanced),
            other => Err(DiagnoseError::UnknownVerbosity(other.to_string())),
        }
    }
}

/// Policy for turning sandbox line numbers into editor line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMapping {
    /// Harness code is appended after the user's buffer; line numbers match
    #[default]
    Direct,
    /// Harness prepends `wrapper_offset` boilerplate lines to the user's buffer
    WrapperOffset,
}

impl FromStr for LineMapping {
    type Err = DiagnoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(LineMapping::Direct),
            "wrapper_offset" | "offset" => Ok(LineMapping::WrapperOffset),
            other => Err(DiagnoseError::UnknownLineMapping(other.to_string())),
        }
    }
}

/// Options for `parse_code_error_with`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub line_mapping: LineMapping,
}

/// Structured classification of raw sandbox output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedError {
    /// Language-native exception name (e.g., "ZeroDivisionError")
    #[serde(rename = "type")]
    pub error_type: String,
    /// One-line description
    pub message: String,
    pub category: ErrorCategory,
    pub execution_phase: ExecutionPhase,
    pub is_user_code_error: bool,
    /// 1-based line in the user's editor buffer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_line: Option<u32>,
    /// Source line and pointer, dedented together
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Original text with sandbox paths cleaned
    pub raw_error: String,
    #[serde(default)]
    pub user_traceback: Vec<String>,
    #[serde(default)]
    pub internal_traceback: Vec<String>,
}

impl ParsedError {
    /// Result for empty or whitespace-only input
    pub fn unknown() -> Self {
        Self {
            error_type: "Error".to_string(),
            message: "Unknown error.".to_string(),
            category: ErrorCategory::Runtime,
            execution_phase: ExecutionPhase::Execution,
            is_user_code_error: true,
            user_line: None,
            code_snippet: None,
            code_line: None,
            pointer: None,
            fix_hint: None,
            raw_error: String::new(),
            user_traceback: Vec::new(),
            internal_traceback: Vec::new(),
        }
    }

    /// A platform-side failure: never the user's fault
    pub fn internal(
        error_type: impl Into<String>,
        message: impl Into<String>,
        raw_error: String,
    ) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            category: ErrorCategory::Internal,
            execution_phase: ExecutionPhase::System,
            is_user_code_error: false,
            raw_error,
            ..Self::unknown()
        }
    }

    pub fn is_internal(&self) -> bool {
        self.category == ErrorCategory::Internal
    }
}
