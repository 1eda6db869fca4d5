//! Error type, message and location extraction

use regex::Regex;
use std::sync::LazyLock;

use super::clean::strip_path_fragments;
use crate::languages::{LanguageConfig, LanguageFamily};

static PYTHON_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Za-z_][\w.]*(?:Error|Exception|Interrupt|Exit|Iteration))\s*(?::|$)")
        .expect("valid python type regex")
});

static PYTHON_TYPE_ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*(?:Error|Exception)):").expect("valid python type regex")
});

static JS_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(TypeError|ReferenceError|RangeError|SyntaxError|EvalError|URIError|AggregateError|Error)\b(?:\s*\[[^\]]*\])?:",
    )
    .expect("valid js type regex")
});

static JAVA_THREAD_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Exception in thread "[^"]*" ([\w.$]+)"#).expect("valid java type regex")
});

static JAVA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[a-z][\w$]*\.)*([A-Z][\w$]*(?:Exception|Error))\b")
        .expect("valid java type regex")
});

static CPP_UNCAUGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"terminate called after throwing an instance of '([^']+)'")
        .expect("valid uncaught regex")
});

static CPP_WHAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)what\(\):\s+(.+)$").expect("valid what regex"));

static SANITIZER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)ERROR: AddressSanitizer: ([\w-]+)(.*)$").expect("valid sanitizer regex")
});

static SYNTAX_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(SyntaxError|IndentationError|TabError)\b").expect("valid syntax name regex")
});

static PYTHON_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"File "[^"]+", line (\d+)"#).expect("valid location regex"));

/// Node prints `path:line` alone above the offending source line
static JS_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\S+?:(\d+)\s*$").expect("valid location regex"));

static JAVA_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m):(\d+): error:").expect("valid location regex"));

static NATIVE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m):(\d+):\d+: (?:fatal )?error:").expect("valid location regex")
});

static COMPILER_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:fatal )?error:\s*(.+)$").expect("valid compiler message regex")
});

static QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(['"]).*(['"])$"#).expect("valid key regex"));

const COMPILATION_ERROR: &str = "CompilationError";

/// Keep only the last segment of a dotted name (`java.lang.Foo` -> `Foo`)
fn short_name(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_string()
}

/// Extract the native error type of a syntax / compile error
pub fn syntax_error_type(text: &str, family: LanguageFamily) -> String {
    if family.is_compiled() {
        return COMPILATION_ERROR.to_string();
    }

    let python_like = SYNTAX_NAME
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_string());

    match family {
        LanguageFamily::JavaScript => "SyntaxError".to_string(),
        _ => python_like.unwrap_or_else(|| "SyntaxError".to_string()),
    }
}

/// Extract the one-line message of a syntax / compile error
pub fn syntax_message(
    text: &str,
    error_type: &str,
    family: LanguageFamily,
    config: &LanguageConfig,
) -> String {
    let extracted = if family.is_compiled() {
        COMPILER_MESSAGE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    } else {
        message_after_type(text, error_type, true)
    };

    extracted
        .map(|m| strip_path_fragments(&m, config))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Invalid syntax.".to_string())
}

fn first_line(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn last_line(re: &Regex, text: &str) -> Option<u32> {
    re.captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Line reported by the parser or compiler, before remapping
pub fn syntax_location(text: &str, family: LanguageFamily) -> Option<u32> {
    match family {
        LanguageFamily::Python => last_line(&PYTHON_LOCATION, text),
        LanguageFamily::JavaScript => first_line(&JS_LOCATION, text),
        LanguageFamily::Java => {
            first_line(&JAVA_LOCATION, text).or_else(|| first_line(&NATIVE_LOCATION, text))
        }
        LanguageFamily::Cpp | LanguageFamily::C => first_line(&NATIVE_LOCATION, text),
        LanguageFamily::Other => {
            first_line(&NATIVE_LOCATION, text).or_else(|| last_line(&PYTHON_LOCATION, text))
        }
    }
}

fn python_runtime_type(text: &str) -> Option<String> {
    PYTHON_TYPE
        .captures_iter(text)
        .last()
        .or_else(|| PYTHON_TYPE_ANYWHERE.captures_iter(text).last())
        .and_then(|caps| caps.get(1))
        .map(|m| short_name(m.as_str()))
}

fn js_runtime_type(text: &str) -> Option<String> {
    JS_TYPE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn java_runtime_type(text: &str) -> Option<String> {
    JAVA_THREAD_TYPE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| short_name(m.as_str()))
        .or_else(|| {
            JAVA_TYPE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
}

fn native_runtime_type(text: &str) -> Option<String> {
    if let Some(caps) = CPP_UNCAUGHT.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    if let Some(caps) = SANITIZER.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    let lower = text.to_lowercase();
    let signal_type = if lower.contains("segmentation fault") || lower.contains("sigsegv") {
        "SegmentationFault"
    } else if lower.contains("floating point exception") || lower.contains("sigfpe") {
        "FloatingPointException"
    } else if lower.contains("stack overflow") || lower.contains("stack-overflow") {
        "StackOverflow"
    } else if lower.contains("bus error") || lower.contains("sigbus") {
        "BusError"
    } else if lower.contains("aborted") || lower.contains("sigabrt") {
        "Aborted"
    } else {
        return None;
    };
    Some(signal_type.to_string())
}

/// Extract the native runtime error type, if any is recognizable
pub fn runtime_error_type(text: &str, family: LanguageFamily) -> Option<String> {
    match family {
        LanguageFamily::Python => python_runtime_type(text),
        LanguageFamily::JavaScript => js_runtime_type(text),
        LanguageFamily::Java => java_runtime_type(text),
        LanguageFamily::Cpp | LanguageFamily::C => native_runtime_type(text),
        LanguageFamily::Other => python_runtime_type(text)
            .or_else(|| java_runtime_type(text))
            .or_else(|| js_runtime_type(text))
            .or_else(|| native_runtime_type(text)),
    }
}

/// Text after `Type:` on the line that carries it
///
/// Python prints the raised exception last; other runtimes print it first.
fn message_after_type(text: &str, error_type: &str, last: bool) -> Option<String> {
    let needle = format!("{}:", error_type);
    let pick = |line: &&str| line.contains(&needle);

    let line = if last {
        text.lines().filter(pick).last()
    } else {
        text.lines().find(pick)
    }?;

    let start = line.find(&needle)? + needle.len();
    let message = line[start..].trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// Canned sentence for a type whose message could not be extracted
pub fn fallback_message(error_type: &str) -> &'static str {
    match error_type {
        "ZeroDivisionError" => "Division by zero.",
        "IndexError" => "Index out of range.",
        "KeyError" => "Key not found.",
        "TypeError" => "An operation was applied to a value of the wrong type.",
        "ValueError" => "A function received an argument with an invalid value.",
        "NameError" => "A name was used before it was defined.",
        "AttributeError" => "The object has no such attribute.",
        "RecursionError" => "Maximum recursion depth exceeded.",
        "MemoryError" | "OutOfMemoryError" => "The program ran out of memory.",
        "StopIteration" => "An iterator was advanced past its end.",
        "AssertionError" => "An assertion failed.",
        "ReferenceError" => "A variable was used before it was declared.",
        "RangeError" => "A value is outside the allowed range.",
        "ArithmeticException" | "FloatingPointException" => "Arithmetic error (division by zero).",
        "NullPointerException" => "Attempted to use a null reference.",
        "ArrayIndexOutOfBoundsException" => "Array index out of bounds.",
        "StringIndexOutOfBoundsException" => "String index out of bounds.",
        "IndexOutOfBoundsException" | "std::out_of_range" => "Index out of range.",
        "ClassCastException" => "Invalid type cast.",
        "NumberFormatException" => "Invalid number format.",
        "StackOverflowError" | "StackOverflow" => "Stack overflow (likely infinite recursion).",
        "SegmentationFault" => "Invalid memory access (segmentation fault).",
        "BusError" => "Invalid memory access (bus error).",
        "Aborted" => "The program aborted.",
        "std::bad_alloc" => "Memory allocation failed.",
        "std::invalid_argument" => "Invalid argument.",
        _ => "An error occurred while running your code.",
    }
}

/// Extract the one-line message of a runtime error
pub fn runtime_message(
    text: &str,
    error_type: &str,
    family: LanguageFamily,
    config: &LanguageConfig,
) -> String {
    let extracted = match family {
        LanguageFamily::Cpp | LanguageFamily::C => CPP_WHAT
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .or_else(|| {
                SANITIZER
                    .captures(text)
                    .and_then(|caps| caps.get(2))
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|m| !m.is_empty())
            }),
        _ => message_after_type(text, error_type, family.innermost_frame_last()),
    };

    let message = extracted
        .map(|m| strip_path_fragments(&m, config))
        .filter(|m| !m.is_empty());

    match message {
        Some(key) if error_type == "KeyError" && QUOTED_KEY.is_match(&key) => {
            format!("Key {} not found.", key)
        }
        Some(message) => message,
        None => fallback_message(error_type).to_string(),
    }
}
