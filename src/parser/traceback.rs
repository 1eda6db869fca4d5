//! Stack frame parsing and user/internal partitioning

use regex::Regex;
use std::sync::LazyLock;

use super::remap::LineMapper;
use crate::languages::{LanguageConfig, LanguageFamily};

static PYTHON_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*File "([^"]+)", line (\d+)(?:, in (.+?))?\s*$"#)
        .expect("valid python frame regex")
});

static JS_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*at\s+(.+?)\s*$").expect("valid js frame regex"));

static JAVA_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at\s+([\w.$/<>]+)\(([^)]*)\)\s*$").expect("valid java frame regex")
});

static SANITIZER_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#(\d+)\s+0x[0-9a-fA-F]+\s+in\s+(\S+)(?:\s+(.+?))?\s*$")
        .expect("valid sanitizer frame regex")
});

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?):(\d+)(?::(\d+))?$").expect("valid location regex"));

static CARET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d*\s*\|)?\s*[\^~][\^~\s]*$").expect("valid caret regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Python,
    JavaScript,
    Java,
    Sanitizer,
}

/// One parsed stack frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    /// The frame line as printed, trimmed
    pub text: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub function: Option<String>,
    /// Sanitizer frame number (`#3`)
    pub ordinal: Option<u32>,
    /// Source line printed beneath a Python frame
    pub source: Option<String>,
    /// Caret line printed beneath `source`
    pub pointer: Option<String>,
}

impl Frame {
    fn new(kind: FrameKind, text: &str) -> Self {
        Self {
            kind,
            text: text.trim().to_string(),
            file: None,
            line: None,
            column: None,
            function: None,
            ordinal: None,
            source: None,
            pointer: None,
        }
    }

    fn with_location(mut self, location: &str) -> Self {
        match LOCATION.captures(location) {
            Some(caps) => {
                self.file = caps.get(1).map(|m| m.as_str().to_string());
                self.line = caps.get(2).and_then(|m| m.as_str().parse().ok());
                self.column = caps.get(3).and_then(|m| m.as_str().parse().ok());
            }
            None => self.file = Some(location.to_string()),
        }
        self
    }

    /// Render the frame against the canonical user file and a remapped line
    fn render_user(&self, canonical: &str, line: u32) -> String {
        let function = self.function.as_deref();
        let location = match self.column {
            Some(column) => format!("{}:{}:{}", canonical, line, column),
            None => format!("{}:{}", canonical, line),
        };

        match self.kind {
            FrameKind::Python => match function {
                Some(f) => format!("File \"{}\", line {}, in {}", canonical, line, f),
                None => format!("File \"{}\", line {}", canonical, line),
            },
            FrameKind::JavaScript => match function {
                Some(f) => format!("at {} ({})", f, location),
                None => format!("at {}", location),
            },
            FrameKind::Java => format!(
                "at {}({}:{})",
                function.unwrap_or("<unknown>"),
                canonical,
                line
            ),
            FrameKind::Sanitizer => format!(
                "#{} in {} {}",
                self.ordinal.unwrap_or(0),
                function.unwrap_or("<unknown>"),
                location
            ),
        }
    }
}

pub(crate) fn is_caret_line(line: &str) -> bool {
    CARET_LINE.is_match(line)
}

fn parse_python(line: &str) -> Option<Frame> {
    let caps = PYTHON_FRAME.captures(line)?;
    let mut frame = Frame::new(FrameKind::Python, line);
    frame.file = caps.get(1).map(|m| m.as_str().to_string());
    frame.line = caps.get(2).and_then(|m| m.as_str().parse().ok());
    frame.function = caps.get(3).map(|m| m.as_str().to_string());
    Some(frame)
}

fn parse_java(line: &str) -> Option<Frame> {
    let caps = JAVA_FRAME.captures(line)?;
    let mut frame = Frame::new(FrameKind::Java, line);
    frame.function = caps.get(1).map(|m| m.as_str().to_string());
    let location = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some(frame.with_location(location))
}

fn parse_js(line: &str) -> Option<Frame> {
    let caps = JS_FRAME.captures(line)?;
    let body = caps.get(1)?.as_str();
    let mut frame = Frame::new(FrameKind::JavaScript, line);

    let location = match (body.rfind(" ("), body.ends_with(')')) {
        (Some(open), true) => {
            frame.function = Some(body[..open].to_string());
            &body[open + 2..body.len() - 1]
        }
        _ => body,
    };
    Some(frame.with_location(location))
}

fn parse_sanitizer(line: &str) -> Option<Frame> {
    let caps = SANITIZER_FRAME.captures(line)?;
    let mut frame = Frame::new(FrameKind::Sanitizer, line);
    frame.ordinal = caps.get(1).and_then(|m| m.as_str().parse().ok());
    frame.function = caps.get(2).map(|m| m.as_str().to_string());
    match caps.get(3) {
        Some(location) => Some(frame.with_location(location.as_str())),
        None => Some(frame),
    }
}

fn parse_frame(line: &str, family: LanguageFamily) -> Option<Frame> {
    match family {
        LanguageFamily::Python => parse_python(line),
        LanguageFamily::JavaScript => parse_js(line),
        LanguageFamily::Java => parse_java(line),
        LanguageFamily::Cpp | LanguageFamily::C => parse_sanitizer(line),
        LanguageFamily::Other => parse_python(line)
            .or_else(|| parse_java(line))
            .or_else(|| parse_js(line))
            .or_else(|| parse_sanitizer(line)),
    }
}

/// Parse every stack frame in `text`, in printed order
pub fn parse_frames(text: &str, family: LanguageFamily) -> Vec<Frame> {
    let lines: Vec<&str> = text.lines().collect();
    let mut frames = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(mut frame) = parse_frame(line, family) else {
            continue;
        };

        if frame.kind == FrameKind::Python {
            let source = lines.get(idx + 1).copied().filter(|next| {
                next.starts_with(char::is_whitespace)
                    && !next.trim().is_empty()
                    && !is_caret_line(next)
                    && parse_python(next).is_none()
            });
            if let Some(source) = source {
                frame.source = Some(source.to_string());
                frame.pointer = lines
                    .get(idx + 2)
                    .copied()
                    .filter(|next| is_caret_line(next))
                    .map(|next| next.to_string());
            }
        }

        frames.push(frame);
    }

    frames
}

/// The user frame closest to where the error was raised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFrame {
    pub line: Option<u32>,
    pub source: Option<String>,
    pub pointer: Option<String>,
}

/// Frames split by ownership; every frame lands in exactly one list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub user: Vec<String>,
    pub internal: Vec<String>,
    pub innermost_user: Option<UserFrame>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.internal.is_empty()
    }
}

/// Split frames into user and internal tracebacks
///
/// A frame naming the user's source file is a user frame unless its line
/// falls outside the user's buffer. Otherwise a frame matching the
/// internal blocklist is internal, and anything else belongs to the user.
pub fn partition_frames(
    frames: &[Frame],
    config: &LanguageConfig,
    mapper: &LineMapper,
) -> Partition {
    let canonical = config.canonical_file();
    let mut partition = Partition::default();
    let mut user_frames: Vec<UserFrame> = Vec::new();

    for frame in frames {
        if !config.is_user_file(&frame.text) && config.is_internal_frame(&frame.text) {
            partition.internal.push(frame.text.clone());
            continue;
        }

        match frame.line {
            Some(reported) => match mapper.to_user_line(reported) {
                Some(line) => {
                    partition.user.push(frame.render_user(&canonical, line));
                    user_frames.push(UserFrame {
                        line: Some(line),
                        source: frame.source.clone(),
                        pointer: frame.pointer.clone(),
                    });
                }
                None => partition.internal.push(frame.text.clone()),
            },
            None => partition.user.push(frame.text.clone()),
        }
    }

    partition.innermost_user = if config.family.innermost_frame_last() {
        user_frames.pop()
    } else {
        user_frames.into_iter().next()
    };

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::resolve_language;
    use crate::parser::types::LineMapping;

    const PYTHON_TRACE: &str = r#"Traceback (most recent call last):
  File "/piston/jobs/9a/file0.code", line 14, in <module>
    print(Solution().twoSum(nums, target))
  File "/piston/jobs/9a/file0.code", line 5, in twoSum
    return nums[i] + nums[j]
           ~~~~^^^
  File "/piston/packages/python/3.12.0/lib/python3.12/json/__init__.py", line 346, in loads
    return _default_decoder.decode(s)
IndexError: list index out of range"#;

    #[test]
    fn test_parse_python_frames_with_source() {
        let frames = parse_frames(PYTHON_TRACE, LanguageFamily::Python);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].line, Some(5));
        assert_eq!(frames[1].function.as_deref(), Some("twoSum"));
        assert_eq!(
            frames[1].source.as_deref(),
            Some("    return nums[i] + nums[j]")
        );
        assert_eq!(frames[1].pointer.as_deref(), Some("           ~~~~^^^"));
        assert!(frames[0].pointer.is_none());
    }

    #[test]
    fn test_partition_routes_piston_runtime_to_internal() {
        let config = resolve_language("python");
        let mapper = LineMapper::new(LineMapping::Direct, &config, 10);
        let frames = parse_frames(PYTHON_TRACE, LanguageFamily::Python);
        let partition = partition_frames(&frames, &config, &mapper);

        assert_eq!(
            partition.user,
            vec![r#"File "Solution.py", line 5, in twoSum"#.to_string()]
        );
        // line 14 is the harness driver appended after the 10-line buffer
        assert_eq!(partition.internal.len(), 2);
        assert!(partition.internal.iter().any(|f| f.contains("/piston/packages/")));
        assert!(partition
            .user
            .iter()
            .all(|f| !partition.internal.contains(f)));
        assert_eq!(partition.innermost_user.unwrap().line, Some(5));
    }

    #[test]
    fn test_partition_js_frames() {
        let trace = "TypeError: x is not a function\n    at solve (/piston/jobs/a/file0.code:7:11)\n    at Object.<anonymous> (/piston/jobs/a/file0.code:3:1)\n    at Module._compile (node:internal/modules/cjs/loader:1256:14)";
        let config = resolve_language("javascript");
        let mapper = LineMapper::new(LineMapping::Direct, &config, 20);
        let frames = parse_frames(trace, LanguageFamily::JavaScript);
        let partition = partition_frames(&frames, &config, &mapper);

        assert_eq!(
            partition.user,
            vec![
                "at solve (Solution.js:7:11)".to_string(),
                "at Object.<anonymous> (Solution.js:3:1)".to_string(),
            ]
        );
        assert_eq!(partition.internal.len(), 1);
        assert_eq!(partition.innermost_user.unwrap().line, Some(7));
    }

    #[test]
    fn test_partition_java_frames() {
        let trace = "Exception in thread \"main\" java.lang.ArrayIndexOutOfBoundsException: Index 5 out of bounds for length 3\n\tat Solution.get(Solution.java:9)\n\tat Main.main(Main.java:21)\n\tat java.base/java.lang.Thread.run(Thread.java:833)";
        let config = resolve_language("java");
        let mapper = LineMapper::new(LineMapping::Direct, &config, 30);
        let frames = parse_frames(trace, LanguageFamily::Java);
        let partition = partition_frames(&frames, &config, &mapper);

        assert_eq!(partition.user, vec!["at Solution.get(Solution.java:9)".to_string()]);
        assert_eq!(partition.internal.len(), 2);
    }

    #[test]
    fn test_offset_mapping_rewrites_user_lines() {
        let trace = "  File \"/piston/jobs/a/file0.code\", line 8, in solve\n    return 1 // 0\nZeroDivisionError: integer division or modulo by zero";
        let config = resolve_language("python");
        let mapper = LineMapper::new(LineMapping::WrapperOffset, &config, 10);
        let frames = parse_frames(trace, LanguageFamily::Python);
        let partition = partition_frames(&frames, &config, &mapper);

        let expected_line = 8 - config.wrapper_offset;
        assert_eq!(
            partition.user,
            vec![format!("File \"Solution.py\", line {}, in solve", expected_line)]
        );
    }

    #[test]
    fn test_sanitizer_frames() {
        let trace = "==1==ERROR: AddressSanitizer: heap-buffer-overflow on address 0x602000000014\n    #0 0x4011a6 in main /piston/jobs/a/file0.code:6:12\n    #1 0x7f0c in __libc_start_main (/lib/x86_64-linux-gnu/libc.so.6+0x21c86)";
        let config = resolve_language("cpp");
        let mapper = LineMapper::new(LineMapping::Direct, &config, 0);
        let frames = parse_frames(trace, LanguageFamily::Cpp);
        let partition = partition_frames(&frames, &config, &mapper);

        assert_eq!(partition.user, vec!["#0 in main Solution.cpp:6:12".to_string()]);
        assert_eq!(partition.internal.len(), 1);
    }
}
