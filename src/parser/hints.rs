//! Coaching hints for common mistakes

use regex::Regex;
use std::sync::LazyLock;

use crate::languages::LanguageFamily;

static PYTHON_UNDEFINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"name '(\w+)' is not defined").expect("valid undefined name regex")
});

static JS_UNDEFINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+) is not defined").expect("valid undefined name regex"));

static JAVA_UNDEFINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"symbol:\s+(?:variable|method|class)\s+(\w+)").expect("valid symbol regex")
});

const PYTHON_NAMES: &[&str] = &[
    "len", "range", "print", "int", "str", "list", "dict", "set", "tuple", "sorted",
    "enumerate", "zip", "min", "max", "sum", "abs", "map", "filter", "isinstance", "float",
    "bool", "reversed", "any", "all", "input", "round", "ord", "chr", "self", "None", "True",
    "False",
];

const JS_NAMES: &[&str] = &[
    "console", "Math", "Array", "Object", "String", "Number", "JSON", "Map", "Set",
    "parseInt", "parseFloat", "undefined", "Infinity", "length",
];

const JAVA_NAMES: &[&str] = &[
    "length", "size", "String", "Integer", "System", "Math", "ArrayList", "HashMap", "List",
    "Map", "charAt", "substring", "append", "Arrays",
];

/// Largest edit distance still worth suggesting
const MAX_SUGGESTION_DISTANCE: u32 = 2;

fn base_hint(error_type: &str, family: LanguageFamily) -> Option<&'static str> {
    let hint = match error_type {
        "IndentationError" | "TabError" => {
            "Indent every line of a block by the same amount, using spaces or tabs but not both."
        }
        "SyntaxError" if family == LanguageFamily::JavaScript => {
            "Check for a missing bracket, parenthesis or comma near this line."
        }
        "SyntaxError" => "Look for a missing colon, bracket or quote on or just before this line.",
        "CompilationError" => {
            "The real mistake is often on the line just before the one the compiler reports."
        }
        "ZeroDivisionError" | "ArithmeticException" | "FloatingPointException" => {
            "Check that the divisor can never be zero before dividing or taking a modulo."
        }
        "IndexError" | "IndexOutOfBoundsException" | "std::out_of_range" => {
            "Valid indices run from 0 to length - 1; check your loop bounds."
        }
        "ArrayIndexOutOfBoundsException" | "StringIndexOutOfBoundsException" => {
            "Valid indices run from 0 to length - 1; check your loop bounds."
        }
        "KeyError" => "Check that the key exists with `in` or use `.get()` before reading it.",
        "TypeError" if family == LanguageFamily::JavaScript => {
            "Check that the value exists and has the type you expect before using it."
        }
        "TypeError" => "Check the types of the values involved; you may need to convert one.",
        "NameError" | "ReferenceError" => {
            "Check the spelling and make sure the name is defined before it is used."
        }
        "AttributeError" => "Check the spelling of the attribute and the type of the object.",
        "RecursionError" | "StackOverflowError" | "StackOverflow" => {
            "Make sure your recursion has a base case that is always reached."
        }
        "NullPointerException" => "Initialize the object before using it, or check for null.",
        "SegmentationFault" | "heap-buffer-overflow" | "stack-buffer-overflow" => {
            "Check array bounds and pointer validity; reading past the end of an array is a common cause."
        }
        "ValueError" | "NumberFormatException" => {
            "Check the value being converted; it may be empty or not in the expected format."
        }
        _ => return None,
    };
    Some(hint)
}

fn undefined_name(message: &str, text: &str, family: LanguageFamily) -> Option<String> {
    let (re, haystack) = match family {
        LanguageFamily::Python => (&*PYTHON_UNDEFINED, message),
        LanguageFamily::JavaScript => (&*JS_UNDEFINED, message),
        LanguageFamily::Java => (&*JAVA_UNDEFINED, text),
        _ => return None,
    };
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Closest well-known name within `MAX_SUGGESTION_DISTANCE` edits
pub fn suggest_name(name: &str, family: LanguageFamily) -> Option<&'static str> {
    let candidates = match family {
        LanguageFamily::Python => PYTHON_NAMES,
        LanguageFamily::JavaScript => JS_NAMES,
        LanguageFamily::Java => JAVA_NAMES,
        _ => return None,
    };

    candidates
        .iter()
        .filter(|candidate| **candidate != name)
        .map(|candidate| {
            let distance = triple_accel::levenshtein(name.as_bytes(), candidate.as_bytes());
            (distance, *candidate)
        })
        .filter(|(distance, _)| {
            *distance <= MAX_SUGGESTION_DISTANCE && (*distance as usize) < name.len()
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Coaching string for a classified error
pub fn fix_hint(
    error_type: &str,
    message: &str,
    text: &str,
    family: LanguageFamily,
) -> Option<String> {
    let suggestion = undefined_name(message, text, family)
        .and_then(|name| suggest_name(&name, family).map(|candidate| (name, candidate)));
    let base = base_hint(error_type, family);

    match (suggestion, base) {
        (Some((name, candidate)), Some(base)) => Some(format!(
            "`{}` is not defined. Did you mean `{}`? {}",
            name, candidate, base
        )),
        (Some((name, candidate)), None) => Some(format!(
            "`{}` is not defined. Did you mean `{}`?",
            name, candidate
        )),
        (None, Some(base)) => Some(base.to_string()),
        (None, None) => None,
    }
}
