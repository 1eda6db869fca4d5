//! Source line and caret pointer extraction

use regex::Regex;
use std::sync::LazyLock;

use super::traceback::{is_caret_line, UserFrame};

/// gcc prints source with a `  12 | ` gutter
static GUTTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d*\s*\| ?").expect("valid gutter regex"));

static FRAME_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:File "|at\s|#\d+\s+0x|Traceback )"#).expect("valid frame regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    /// The offending source line, trimmed
    pub code_line: String,
    /// Caret line aligned to `snippet`'s source line
    pub pointer: Option<String>,
    /// Source line and pointer dedented together
    pub snippet: String,
}

fn leading_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn build(source: &str, pointer: Option<&str>) -> Option<Snippet> {
    let source = GUTTER.replace(source, "").into_owned();
    let pointer = pointer.map(|p| GUTTER.replace(p, "").into_owned());

    if source.trim().is_empty() {
        return None;
    }

    let indent = match &pointer {
        Some(p) => leading_width(&source).min(leading_width(p)),
        None => leading_width(&source),
    };
    let dedent = |line: &str| line.chars().skip(indent).collect::<String>();

    let code = dedent(&source).trim_end().to_string();
    let pointer = pointer.map(|p| dedent(&p).trim_end().to_string());
    let snippet = match &pointer {
        Some(p) => format!("{}\n{}", code, p),
        None => code.clone(),
    };

    Some(Snippet {
        code_line: source.trim().to_string(),
        pointer,
        snippet,
    })
}

/// Snippet from the last caret line in the text and the source line above it
pub fn from_caret(text: &str) -> Option<Snippet> {
    let lines: Vec<&str> = text.lines().collect();

    lines
        .iter()
        .enumerate()
        .rev()
        .filter(|(idx, line)| *idx > 0 && is_caret_line(line))
        .find_map(|(idx, line)| {
            let source = lines[idx - 1];
            if source.trim().is_empty() || FRAME_LIKE.is_match(source) || is_caret_line(source) {
                return None;
            }
            build(source, Some(*line))
        })
}

/// Snippet for the innermost user frame, falling back to any caret in the text
pub fn extract_snippet(text: &str, innermost: Option<&UserFrame>) -> Option<Snippet> {
    let from_frame = innermost.and_then(|frame| {
        frame
            .source
            .as_deref()
            .and_then(|source| build(source, frame.pointer.as_deref()))
    });

    from_frame.or_else(|| from_caret(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_syntax_caret() {
        let text = "  File \"Solution.py\", line 3\n    if x == 1\n             ^\nSyntaxError: expected ':'";
        let snippet = from_caret(text).unwrap();

        assert_eq!(snippet.code_line, "if x == 1");
        assert_eq!(snippet.pointer.as_deref(), Some("         ^"));
        assert_eq!(snippet.snippet, "if x == 1\n         ^");
    }

    #[test]
    fn test_gcc_gutter_is_removed() {
        let text = "file0.code:7:5: error: expected ';' before '}' token\n    6 |     int x = 5\n      |              ^\n      |              ;";
        let snippet = from_caret(text).unwrap();

        assert_eq!(snippet.code_line, "int x = 5");
        assert_eq!(snippet.snippet, "int x = 5\n         ^");
    }

    #[test]
    fn test_frame_source_preferred() {
        let frame = UserFrame {
            line: Some(5),
            source: Some("    return nums[i] + nums[j]".to_string()),
            pointer: Some("           ~~~~^^^".to_string()),
        };
        let snippet = extract_snippet("unrelated\n  ^", Some(&frame)).unwrap();

        assert_eq!(snippet.code_line, "return nums[i] + nums[j]");
        assert_eq!(snippet.snippet, "return nums[i] + nums[j]\n       ~~~~^^^");
    }

    #[test]
    fn test_no_snippet_without_source() {
        assert!(extract_snippet("ZeroDivisionError: division by zero", None).is_none());
    }
}
