use diagnose::{
    clean_error_message, format_error_output, is_runtime_error, is_syntax_error,
    looks_like_error, parse_code_error, ErrorCategory, ExecutionPhase, ParsedError, Verbosity,
};

const LANGUAGES: &[&str] = &["python", "javascript", "typescript", "java", "cpp", "c", "ruby"];

fn assert_invariants(parsed: &ParsedError) {
    if parsed.category == ErrorCategory::Internal {
        assert!(!parsed.is_user_code_error, "internal blamed on user: {:?}", parsed);
        assert_eq!(parsed.execution_phase, ExecutionPhase::System);
    }
    if parsed.category == ErrorCategory::Syntax {
        assert_eq!(parsed.execution_phase, ExecutionPhase::Parse);
    }
    for frame in &parsed.user_traceback {
        assert!(
            !parsed.internal_traceback.contains(frame),
            "frame in both tracebacks: {}",
            frame
        );
    }
}

#[test]
fn empty_input_is_unknown_runtime_error() {
    for language in LANGUAGES {
        for raw in ["", " ", "\n\n", "\t \r\n"] {
            let parsed = parse_code_error(raw, language, 12);
            assert_eq!(parsed.category, ErrorCategory::Runtime);
            assert!(parsed.is_user_code_error);
            assert_eq!(parsed.message, "Unknown error.");
        }
    }
}

#[test]
fn zero_division_is_user_runtime_error() {
    let parsed = parse_code_error("ZeroDivisionError: division by zero", "python", 5);

    assert_eq!(parsed.error_type, "ZeroDivisionError");
    assert_eq!(parsed.category, ErrorCategory::Runtime);
    assert!(parsed.is_user_code_error);
    assert_invariants(&parsed);
}

#[test]
fn indentation_error_is_parse_phase_syntax_error() {
    let parsed = parse_code_error("IndentationError: unexpected indent", "python", 5);

    assert_eq!(parsed.category, ErrorCategory::Syntax);
    assert_eq!(parsed.execution_phase, ExecutionPhase::Parse);
    assert!(is_syntax_error("IndentationError: unexpected indent", "python"));
}

#[test]
fn timeout_is_internal_for_every_language() {
    for language in LANGUAGES {
        let parsed = parse_code_error("Execution timed out", language, 5);
        assert_eq!(parsed.category, ErrorCategory::Internal);
        assert!(!parsed.is_user_code_error);
        assert_invariants(&parsed);
    }
}

#[test]
fn input_contract_phrase_without_line_references_is_platform_fault() {
    let parsed = parse_code_error("TypeError: 'NoneType' object is not iterable", "python", 5);

    assert!(!parsed.is_user_code_error);
    assert_eq!(parsed.message, "Invalid input format.");
    assert_invariants(&parsed);
}

#[test]
fn piston_frames_never_reach_user_traceback() {
    let raw = r#"Traceback (most recent call last):
  File "/piston/jobs/5f2/harness.py", line 31, in <module>
    result = run(Solution(), data)
  File "/piston/jobs/5f2/file0.code", line 6, in maxProfit
    best = max(best, prices[i] - low)
                     ~~~~~~^^^
  File "/piston/packages/python/3.12.0/lib/python3.12/functools.py", line 12, in wrapper
IndexError: list index out of range"#;
    let parsed = parse_code_error(raw, "python", 20);

    assert_eq!(parsed.category, ErrorCategory::Runtime);
    assert_eq!(parsed.user_line, Some(6));
    assert_eq!(parsed.user_traceback.len(), 1);
    assert_eq!(parsed.internal_traceback.len(), 2);
    assert!(parsed.user_traceback.iter().all(|f| !f.contains("/piston/")));
    assert!(parsed.internal_traceback.iter().all(|f| f.contains("/piston/")));
    assert_eq!(
        parsed.code_line.as_deref(),
        Some("best = max(best, prices[i] - low)")
    );
    assert_invariants(&parsed);
}

#[test]
fn predicates_and_cleaning() {
    let raw = "\x1b[31mTraceback (most recent call last):\x1b[0m\r\n  File \"/piston/jobs/9/file0.code\", line 2, in <module>\r\nKeyError: 'b'";

    assert!(looks_like_error(raw));
    assert!(is_runtime_error(raw, "python"));
    assert!(!is_syntax_error(raw, "python"));

    let cleaned = clean_error_message(raw, "python");
    assert!(!cleaned.contains('\x1b'));
    assert!(!cleaned.contains('\r'));
    assert!(cleaned.contains("File \"Solution.py\", line 2"));
}

#[test]
fn formatted_output_respects_category() {
    let runtime = parse_code_error("ZeroDivisionError: division by zero", "python", 5);
    let internal = parse_code_error("Execution timed out", "python", 5);

    for verbosity in [Verbosity::Beginner, Verbosity::Standard, Verbosity::Advanced] {
        assert!(format_error_output(&runtime, verbosity).contains("ZeroDivisionError"));
        assert!(format_error_output(&internal, verbosity).contains("not a problem with your code"));
    }
}

#[test]
fn parsed_error_round_trips_through_json() {
    let parsed = parse_code_error("IndentationError: unexpected indent", "python", 5);
    let json = serde_json::to_string(&parsed).unwrap();
    let back: ParsedError = serde_json::from_str(&json).unwrap();

    assert_eq!(back, parsed);
    assert!(json.contains("\"type\":\"IndentationError\""));
    assert!(json.contains("\"executionPhase\":\"parse\""));
}
