//! Parser module - Sandbox error classification
//!
//! Turns the raw stdout/stderr text returned by the execution sandbox
//! into a structured `ParsedError`:
//! - Category (syntax / runtime / internal) and whether the user is at fault
//! - Native error type and a one-line message
//! - The offending line in the user's editor buffer, with snippet
//! - User and internal tracebacks, with sandbox paths cleaned
//!
//! Everything here is a pure function over strings. The classifier never
//! fails: unrecognized output degrades to a generic bucket.

pub mod classify;
pub mod clean;
pub mod extract;
pub mod format;
pub mod hints;
pub mod remap;
pub mod snippet;
pub mod traceback;
pub mod types;

use tracing::debug;

use crate::languages::{resolve_language, LanguageConfig};
use classify::{detect_input_contract, detect_system_failure, has_syntax_evidence};
use remap::LineMapper;
use snippet::{extract_snippet, from_caret, Snippet};
use traceback::{parse_frames, partition_frames, Partition};

pub use classify::looks_like_error;
pub use clean::clean_error_message;
pub use format::format_error_output;
pub use types::{
    ErrorCategory, ExecutionPhase, LineMapping, ParseOptions, ParsedError, Verbosity,
};

const INVALID_INPUT_MESSAGE: &str = "Invalid input format.";
const HARNESS_MESSAGE: &str = "The error occurred inside the judge harness, not in your code.";

/// Everything the classification steps share for one input
struct ErrorContext<'a> {
    text: String,
    cleaned: String,
    config: &'a LanguageConfig,
    mapper: LineMapper,
    partition: Partition,
}

impl ErrorContext<'_> {
    fn apply_snippet(&self, parsed: &mut ParsedError, snippet: Option<Snippet>) {
        if let Some(snippet) = snippet {
            parsed.code_line = Some(snippet.code_line);
            parsed.pointer = snippet.pointer;
            parsed.code_snippet = Some(snippet.snippet);
        }
    }

    fn with_tracebacks(&self, mut parsed: ParsedError) -> ParsedError {
        parsed.user_traceback = self.partition.user.clone();
        parsed.internal_traceback = self.partition.internal.clone();
        parsed
    }

    fn internal(&self, error_type: &str, message: &str) -> ParsedError {
        let parsed = ParsedError::internal(error_type, message, self.cleaned.clone());
        self.with_tracebacks(parsed)
    }

    fn syntax(&self) -> ParsedError {
        let family = self.config.family;
        let error_type = extract::syntax_error_type(&self.text, family);
        let message = extract::syntax_message(&self.text, &error_type, family, self.config);
        let user_line = extract::syntax_location(&self.text, family)
            .and_then(|line| self.mapper.to_user_line_clamped(line))
            .or_else(|| {
                self.partition
                    .innermost_user
                    .as_ref()
                    .and_then(|frame| frame.line)
            });
        let fix_hint = hints::fix_hint(&error_type, &message, &self.text, family);

        let mut parsed = ParsedError {
            error_type,
            message,
            category: ErrorCategory::Syntax,
            execution_phase: ExecutionPhase::Parse,
            is_user_code_error: true,
            user_line,
            fix_hint,
            raw_error: self.cleaned.clone(),
            ..ParsedError::unknown()
        };

        let snippet = from_caret(&self.text)
            .or_else(|| extract_snippet(&self.text, self.partition.innermost_user.as_ref()));
        self.apply_snippet(&mut parsed, snippet);
        self.with_tracebacks(parsed)
    }

    fn runtime(&self) -> ParsedError {
        let family = self.config.family;
        let error_type = extract::runtime_error_type(&self.text, family)
            .unwrap_or_else(|| "RuntimeError".to_string());

        if !self.partition.is_empty() && self.partition.user.is_empty() {
            debug!(
                "No user frames in {} traceback, treating {} as a harness failure",
                self.config.name, error_type
            );
            return self.internal(&error_type, HARNESS_MESSAGE);
        }

        let message = extract::runtime_message(&self.text, &error_type, family, self.config);
        let innermost = self.partition.innermost_user.as_ref();
        let fix_hint = hints::fix_hint(&error_type, &message, &self.text, family);

        let mut parsed = ParsedError {
            error_type,
            message,
            category: ErrorCategory::Runtime,
            execution_phase: ExecutionPhase::Execution,
            is_user_code_error: true,
            user_line: innermost.and_then(|frame| frame.line),
            fix_hint,
            raw_error: self.cleaned.clone(),
            ..ParsedError::unknown()
        };

        self.apply_snippet(&mut parsed, extract_snippet(&self.text, innermost));
        self.with_tracebacks(parsed)
    }
}

/// Classify raw sandbox output using the default line mapping
pub fn parse_code_error(raw_error: &str, language: &str, user_code_line_count: u32) -> ParsedError {
    parse_code_error_with(
        raw_error,
        language,
        user_code_line_count,
        &ParseOptions::default(),
    )
}

/// Classify raw sandbox output
///
/// Checks run in order and the first match wins: input-contract failure,
/// system failure, syntax error, then runtime error.
pub fn parse_code_error_with(
    raw_error: &str,
    language: &str,
    user_code_line_count: u32,
    options: &ParseOptions,
) -> ParsedError {
    if raw_error.trim().is_empty() {
        return ParsedError::unknown();
    }

    let config = resolve_language(language);
    let text = clean::normalize_text(raw_error);
    let mapper = LineMapper::new(options.line_mapping, &config, user_code_line_count);
    let frames = parse_frames(&text, config.family);
    let partition = partition_frames(&frames, &config, &mapper);

    let ctx = ErrorContext {
        cleaned: clean::clean_with(&text, &config),
        text,
        config: &config,
        mapper,
        partition,
    };

    if let Some(phrase) = detect_input_contract(&ctx.text, ctx.config) {
        debug!(
            "Input-contract phrase {:?} matched for {} without user execution",
            phrase, ctx.config.name
        );
        let error_type = extract::runtime_error_type(&ctx.text, ctx.config.family)
            .unwrap_or_else(|| "InvalidInput".to_string());
        return ctx.internal(&error_type, INVALID_INPUT_MESSAGE);
    }

    if let Some(failure) = detect_system_failure(&ctx.text) {
        debug!("System failure {:?} detected", failure.phrase);
        return ctx.internal(failure.error_type, failure.message);
    }

    let parsed = if has_syntax_evidence(&ctx.text, ctx.config.family) {
        ctx.syntax()
    } else {
        ctx.runtime()
    };

    debug!(
        "Classified {} error as {}/{} (type={}, line={:?}, mapping={:?})",
        ctx.config.name,
        parsed.category,
        parsed.execution_phase,
        parsed.error_type,
        parsed.user_line,
        ctx.mapper.policy()
    );

    parsed
}

/// True when the text contains a syntax or compile error for `language`
pub fn is_syntax_error(raw_error: &str, language: &str) -> bool {
    let config = resolve_language(language);
    has_syntax_evidence(&clean::normalize_text(raw_error), config.family)
}

/// True when the text reads as an error raised by the user's running code
pub fn is_runtime_error(raw_error: &str, language: &str) -> bool {
    looks_like_error(raw_error)
        && parse_code_error(raw_error, language, 0).category == ErrorCategory::Runtime
}
