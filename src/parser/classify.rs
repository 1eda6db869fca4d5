//! Ordered classification checks
//!
//! Each check looks at the normalized sandbox text and answers one
//! question. `parse_code_error` runs them in order and the first match
//! decides the category:
//! 1. input-contract failure (harness fed malformed input)
//! 2. system failure (timeouts, kills, memory, runner faults)
//! 3. syntax / compile error
//! 4. runtime error

use regex::{Regex, RegexSet};
use std::sync::LazyLock;

use crate::languages::{LanguageConfig, LanguageFamily};

static LINE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bline \d+").expect("valid line reference regex"));

/// Loop headers echoed as source lines in a traceback
static LOOP_CONSTRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:for\s+.+?\s+in\s+.+|while\s+.+):\s*$").expect("valid loop regex")
});

/// Line references above this count mean the user's code ran for real
const MEANINGFUL_LINE_REFERENCES: usize = 2;

/// A sandbox-side failure and how it is reported
#[derive(Debug, PartialEq, Eq)]
pub struct SystemFailure {
    pub phrase: &'static str,
    pub error_type: &'static str,
    pub message: &'static str,
}

const fn failure(
    phrase: &'static str,
    error_type: &'static str,
    message: &'static str,
) -> SystemFailure {
    SystemFailure {
        phrase,
        error_type,
        message,
    }
}

const TIMEOUT_MESSAGE: &str = "Execution timed out.";
const MEMORY_MESSAGE: &str = "The sandbox ran out of memory while running your code.";
const KILLED_MESSAGE: &str = "The sandbox stopped the process before it finished.";
const RUNNER_MESSAGE: &str = "The code runner reported an internal problem.";

const SYSTEM_FAILURES: &[SystemFailure] = &[
    failure("execution timed out", "TimeoutError", TIMEOUT_MESSAGE),
    failure("time limit exceeded", "TimeoutError", TIMEOUT_MESSAGE),
    failure("timed out after", "TimeoutError", TIMEOUT_MESSAGE),
    failure("sigxcpu", "TimeoutError", TIMEOUT_MESSAGE),
    failure("out of memory", "MemoryLimitExceeded", MEMORY_MESSAGE),
    failure("oom-killer", "MemoryLimitExceeded", MEMORY_MESSAGE),
    failure("memory limit exceeded", "MemoryLimitExceeded", MEMORY_MESSAGE),
    failure("sigkill", "ProcessKilled", KILLED_MESSAGE),
    failure("internal server error", "InternalError", RUNNER_MESSAGE),
    failure("sandbox error", "InternalError", RUNNER_MESSAGE),
    failure("failed to spawn", "InternalError", RUNNER_MESSAGE),
    failure("runtime is unknown", "InternalError", RUNNER_MESSAGE),
    failure("service unavailable", "InternalError", RUNNER_MESSAGE),
    failure("too many requests", "InternalError", RUNNER_MESSAGE),
    failure("econnrefused", "InternalError", RUNNER_MESSAGE),
];

static PYTHON_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(SyntaxError|IndentationError|TabError)\b").expect("valid python syntax regex")
});

static JS_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSyntaxError\b").expect("valid js syntax regex"));

const JS_SYNTAX_PHRASES: &[&str] = &[
    "unexpected token",
    "unexpected end of input",
    "missing ) after argument list",
    "invalid or unexpected token",
    "unexpected identifier",
];

static JAVA_COMPILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m):\d+: error:").expect("valid javac regex"));

static NATIVE_COMPILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?::\d+:\d+: (?:fatal )?error:|error: expected .+ before .+ token|undefined reference to)")
        .expect("valid gcc regex")
});

/// Evidence that text is an error report rather than program output
static ERROR_EVIDENCE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"Traceback \(most recent call last\)",
        r"(?m)^\s*(?:Uncaught\s+)?[A-Za-z_][\w.]*(?:Error|Exception)\b(?::|\s*$)",
        r"Exception in thread",
        r"(?m):\d+(?::\d+)?: (?:fatal )?error:",
        r"(?i)segmentation fault|core dumped|terminate called after throwing|AddressSanitizer|floating point exception",
        r"(?m)^\s+at .+:\d+(?::\d+)?\)?\s*$",
    ])
    .expect("valid error evidence set")
});

/// True when the text shows the user's code actually ran for a while
///
/// Heuristic: more than two `line N` references, or a loop header echoed
/// from the user's source.
pub fn has_meaningful_user_execution(text: &str) -> bool {
    LINE_REFERENCE.find_iter(text).count() > MEANINGFUL_LINE_REFERENCES
        || LOOP_CONSTRUCT.is_match(text)
}

/// Input-contract phrase matched without evidence of real user execution
pub fn detect_input_contract<'a>(text: &str, config: &'a LanguageConfig) -> Option<&'a str> {
    let phrase = config.input_contract_match(text)?;
    if has_meaningful_user_execution(text) {
        return None;
    }
    Some(phrase)
}

pub fn detect_system_failure(text: &str) -> Option<&'static SystemFailure> {
    let lower = text.to_lowercase();
    SYSTEM_FAILURES
        .iter()
        .find(|failure| lower.contains(failure.phrase))
}

pub fn has_syntax_evidence(text: &str, family: LanguageFamily) -> bool {
    let js_phrase = || {
        let lower = text.to_lowercase();
        JS_SYNTAX_PHRASES.iter().any(|phrase| lower.contains(phrase))
    };

    match family {
        LanguageFamily::Python => PYTHON_SYNTAX.is_match(text),
        LanguageFamily::JavaScript => JS_SYNTAX.is_match(text) || js_phrase(),
        LanguageFamily::Java => text.contains("';' expected") || JAVA_COMPILE.is_match(text),
        LanguageFamily::Cpp | LanguageFamily::C => NATIVE_COMPILE.is_match(text),
        LanguageFamily::Other => {
            PYTHON_SYNTAX.is_match(text) || js_phrase() || NATIVE_COMPILE.is_match(text)
        }
    }
}

/// Heuristic check for text that reads like an error report
pub fn looks_like_error(text: &str) -> bool {
    !text.trim().is_empty() && ERROR_EVIDENCE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::resolve_language;

    #[test]
    fn test_meaningful_execution_by_line_references() {
        let two = "File \"a\", line 1\nFile \"b\", line 2\n";
        let three = "File \"a\", line 1\nFile \"b\", line 2\nFile \"c\", line 9\n";
        assert!(!has_meaningful_user_execution(two));
        assert!(has_meaningful_user_execution(three));
    }

    #[test]
    fn test_meaningful_execution_by_loop_source() {
        let text = "  File \"Solution.py\", line 4, in solve\n    for item in nums:\nTypeError: 'int' object is not iterable";
        assert!(has_meaningful_user_execution(text));
        assert!(!has_meaningful_user_execution("Error while loading: bad input"));
    }

    #[test]
    fn test_detect_input_contract_requires_no_execution_evidence() {
        let python = resolve_language("python");
        let bare = "TypeError: 'NoneType' object is not iterable";
        assert_eq!(
            detect_input_contract(bare, &python),
            Some("object is not iterable")
        );

        let looped = "    while i in data:\nTypeError: 'NoneType' object is not iterable";
        assert_eq!(detect_input_contract(looped, &python), None);
    }

    #[test]
    fn test_detect_system_failure() {
        let failure = detect_system_failure("Execution Timed Out after 3000ms").unwrap();
        assert_eq!(failure.error_type, "TimeoutError");
        assert_eq!(
            detect_system_failure("Killed by SIGKILL").unwrap().error_type,
            "ProcessKilled"
        );
        assert!(detect_system_failure("ZeroDivisionError: division by zero").is_none());
    }

    #[test]
    fn test_syntax_evidence_per_family() {
        assert!(has_syntax_evidence(
            "IndentationError: unexpected indent",
            LanguageFamily::Python
        ));
        assert!(has_syntax_evidence(
            "SyntaxError: Unexpected token '}'",
            LanguageFamily::JavaScript
        ));
        assert!(has_syntax_evidence(
            "Solution.java:5: error: ';' expected",
            LanguageFamily::Java
        ));
        assert!(has_syntax_evidence(
            "file0.code:7:5: error: expected ';' before '}' token",
            LanguageFamily::Cpp
        ));
        assert!(!has_syntax_evidence(
            "ZeroDivisionError: division by zero",
            LanguageFamily::Python
        ));
    }

    #[test]
    fn test_looks_like_error() {
        assert!(looks_like_error(
            "Traceback (most recent call last):\n  File \"x\", line 1"
        ));
        assert!(looks_like_error("ValueError: bad value"));
        assert!(looks_like_error("Segmentation fault (core dumped)"));
        assert!(!looks_like_error("[1, 2, 3]\nanswer = 6\n"));
        assert!(!looks_like_error("   "));
    }
}
