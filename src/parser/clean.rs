//! Text normalization for sandbox output

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::languages::{resolve_language, LanguageConfig};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ansi regex"));

/// Per-job scratch directories of the sandbox
static SANDBOX_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:/piston/jobs|/box|/sandbox|/tmp)/[\w.-]+/").expect("valid sandbox dir regex")
});

/// `(Solution.py, line 3)` style suffixes on Python syntax messages
static LOCATION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*\(\s*["']?[^()]*?["']?,\s*line \d+\)"#).expect("valid location regex")
});

/// Remaining absolute paths, reduced to their file name
///
/// A path must start a token (text start, whitespace, quote or `(`) and
/// either sit under a well-known root or be at least three segments deep
/// ending in a file with an extension. Dates and `a/b` values are left alone.
static ABSOLUTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<lead>^|[\s'"(])(?:/(?:usr|lib|lib64|home|piston|tmp|box|sandbox|opt|var|etc|root|app|nix)(?:/[\w.@+-]+)*/(?P<rooted>[\w.@+-]+)|(?:/[\w.@+-]+){2,}/(?P<nested>[\w@+-]+\.[A-Za-z0-9]+))"#,
    )
    .expect("valid absolute path regex")
});

/// Strip terminal escapes and normalize line endings
pub(crate) fn normalize_text(raw: &str) -> String {
    let text = ANSI_ESCAPE.replace_all(raw, "");
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Rewrite every reference to the user's source file as `Solution.<ext>`
pub(crate) fn canonicalize_user_files(text: &str, config: &LanguageConfig) -> String {
    match &config.user_file_pattern {
        Some(pattern) => pattern
            .replace_all(text, config.canonical_file().as_str())
            .into_owned(),
        None => text.to_string(),
    }
}

fn file_name_of_path(caps: &Captures<'_>) -> String {
    let lead = caps.name("lead").map_or("", |m| m.as_str());
    let name = caps
        .name("rooted")
        .or_else(|| caps.name("nested"))
        .map_or("", |m| m.as_str());
    format!("{}{}", lead, name)
}

pub(crate) fn clean_with(text: &str, config: &LanguageConfig) -> String {
    let canonical = canonicalize_user_files(text, config);
    SANDBOX_DIR.replace_all(&canonical, "").trim().to_string()
}

/// Clean raw sandbox output for display
///
/// Removes ANSI escapes, normalizes line endings, rewrites the user's
/// source path to `Solution.<ext>` and drops sandbox scratch directories.
pub fn clean_error_message(raw: &str, language: &str) -> String {
    let config = resolve_language(language);
    clean_with(&normalize_text(raw), &config)
}

/// Reduce a one-line message to something free of sandbox paths
pub(crate) fn strip_path_fragments(message: &str, config: &LanguageConfig) -> String {
    let cleaned = clean_with(message, config);
    let cleaned = LOCATION_SUFFIX.replace_all(&cleaned, "");
    ABSOLUTE_PATH
        .replace_all(&cleaned, file_name_of_path)
        .trim()
        .to_string()
}
