//! Human-readable rendering of a classified error

use super::types::{ErrorCategory, ParsedError, Verbosity};

const RETRY_NOTICE: &str = "This is not a problem with your code. Please try again.";

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn headline(parsed: &ParsedError) -> String {
    match parsed.user_line {
        Some(line) => format!("{} on line {}: {}", parsed.error_type, line, parsed.message),
        None => format!("{}: {}", parsed.error_type, parsed.message),
    }
}

fn beginner_intro(parsed: &ParsedError) -> String {
    let place = parsed
        .user_line
        .map(|line| format!(" on line {}", line))
        .unwrap_or_default();

    match parsed.category {
        ErrorCategory::Syntax => format!(
            "Your code could not be run because of a syntax error{}.",
            place
        ),
        _ => format!("Your code stopped with an error while running{}.", place),
    }
}

fn format_internal(parsed: &ParsedError, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Beginner => format!(
            "Something went wrong on our side while running your code. {}",
            RETRY_NOTICE
        ),
        Verbosity::Standard => format!("{} {}", parsed.message, RETRY_NOTICE),
        Verbosity::Advanced => {
            let mut out = format!(
                "{} {}\n\nDetails: {}",
                parsed.message, RETRY_NOTICE, parsed.error_type
            );
            if !parsed.internal_traceback.is_empty() {
                out.push_str("\n\nRunner traceback:\n");
                out.push_str(&indent(&parsed.internal_traceback.join("\n")));
            }
            out
        }
    }
}

/// Render a parsed error for display, scaled by verbosity
///
/// Internal errors always carry the "not your fault" notice. Syntax and
/// runtime errors show type, message, line and snippet; beginners also
/// get a plain-language intro and the hint, advanced users get the
/// user traceback instead of the hint.
pub fn format_error_output(parsed: &ParsedError, verbosity: Verbosity) -> String {
    if parsed.category == ErrorCategory::Internal {
        return format_internal(parsed, verbosity);
    }

    let mut sections = Vec::new();

    if verbosity == Verbosity::Beginner {
        sections.push(beginner_intro(parsed));
    }

    sections.push(headline(parsed));

    if let Some(snippet) = &parsed.code_snippet {
        sections.push(indent(snippet));
    }

    match verbosity {
        Verbosity::Beginner | Verbosity::Standard => {
            if let Some(hint) = &parsed.fix_hint {
                sections.push(format!("Hint: {}", hint));
            }
        }
        Verbosity::Advanced => {
            if !parsed.user_traceback.is_empty() {
                sections.push(format!(
                    "Traceback:\n{}",
                    indent(&parsed.user_traceback.join("\n"))
                ));
            }
        }
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ExecutionPhase;

    fn runtime_error() -> ParsedError {
        ParsedError {
            error_type: "ZeroDivisionError".to_string(),
            message: "division by zero".to_string(),
            category: ErrorCategory::Runtime,
            execution_phase: ExecutionPhase::Execution,
            is_user_code_error: true,
            user_line: Some(4),
            code_snippet: Some("return a / b\n       ~~^~~".to_string()),
            code_line: Some("return a / b".to_string()),
            pointer: Some("       ~~^~~".to_string()),
            fix_hint: Some("Check the divisor.".to_string()),
            raw_error: String::new(),
            user_traceback: vec!["File \"Solution.py\", line 4, in divide".to_string()],
            internal_traceback: Vec::new(),
        }
    }

    #[test]
    fn test_standard_output() {
        let out = format_error_output(&runtime_error(), Verbosity::Standard);
        assert_eq!(
            out,
            "ZeroDivisionError on line 4: division by zero\n\n    return a / b\n           ~~^~~\n\nHint: Check the divisor."
        );
    }

    #[test]
    fn test_beginner_adds_intro() {
        let out = format_error_output(&runtime_error(), Verbosity::Beginner);
        assert!(out.starts_with("Your code stopped with an error while running on line 4."));
        assert!(out.contains("Hint:"));
    }

    #[test]
    fn test_advanced_shows_traceback_not_hint() {
        let out = format_error_output(&runtime_error(), Verbosity::Advanced);
        assert!(out.contains("Traceback:\n    File \"Solution.py\", line 4, in divide"));
        assert!(!out.contains("Hint:"));
    }

    #[test]
    fn test_internal_error_is_not_blamed_on_user() {
        let parsed = ParsedError::internal("TimeoutError", "Execution timed out.", String::new());
        for verbosity in [Verbosity::Beginner, Verbosity::Standard, Verbosity::Advanced] {
            let out = format_error_output(&parsed, verbosity);
            assert!(out.contains(RETRY_NOTICE));
        }
    }
}
