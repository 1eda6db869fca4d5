//! Language classification table for sandbox output

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{LazyLock, OnceLock};

use anyhow::Context;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::warn;

use crate::error::DiagnoseError;

const EMBEDDED_LANGUAGES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/languages.toml"));

const GENERIC_USER_FILE: &str = "file0.code";

/// Compiled size cap for a language's user-file pattern
const USER_FILE_PATTERN_LIMIT: usize = 1 << 20;

static GENERIC_USER_FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    user_file_pattern(&[GENERIC_USER_FILE.to_string()])
        .expect("valid generic user file pattern")
});

/// Pattern matching any user-file marker, with an optional leading directory
fn user_file_pattern(markers: &[String]) -> Result<Regex, regex::Error> {
    let alternatives = markers
        .iter()
        .map(|marker| regex::escape(marker))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&format!(r#"(?:/[^\s"'():]*/)?(?:{})"#, alternatives))
        .case_insensitive(true)
        .size_limit(USER_FILE_PATTERN_LIMIT)
        .build()
}

/// Stack trace and diagnostic format family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageFamily {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
    Other,
}

impl LanguageFamily {
    /// Compiled languages report syntax problems as compiler diagnostics
    pub fn is_compiled(self) -> bool {
        matches!(self, LanguageFamily::Java | LanguageFamily::Cpp | LanguageFamily::C)
    }

    /// Python prints the innermost frame last, everyone else prints it first
    pub fn innermost_frame_last(self) -> bool {
        matches!(self, LanguageFamily::Python)
    }
}

/// Classification settings for a supported programming language
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Table key (e.g., "python")
    pub name: String,
    pub family: LanguageFamily,
    /// Extension of the canonical user file (e.g., "py" for Solution.py)
    pub extension: String,
    /// Number of boilerplate lines the harness prepends to user code
    pub wrapper_offset: u32,
    /// Lowercase markers identifying the user's source file in a frame
    pub user_files: Vec<String>,
    /// Lowercase path fragments identifying runtime or harness frames
    pub internal_frames: Vec<String>,
    /// Lowercase phrases raised when the harness feeds malformed input
    pub input_contract: Vec<String>,
    /// Compiled `user_files` markers; None when there are no markers
    pub(crate) user_file_pattern: Option<Regex>,
}

impl LanguageConfig {
    /// Fallback used for languages missing from the table
    pub fn generic(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            family: LanguageFamily::Other,
            extension: "txt".to_string(),
            wrapper_offset: 0,
            user_files: vec![GENERIC_USER_FILE.to_string()],
            internal_frames: vec![
                "/piston/".to_string(),
                "node:internal".to_string(),
                "<frozen ".to_string(),
            ],
            input_contract: Vec::new(),
            user_file_pattern: Some(GENERIC_USER_FILE_PATTERN.clone()),
        }
    }

    /// The file name shown to the user, e.g. `Solution.py`
    pub fn canonical_file(&self) -> String {
        format!("Solution.{}", self.extension)
    }

    pub fn is_user_file(&self, frame: &str) -> bool {
        let lower = frame.to_lowercase();
        self.user_files.iter().any(|marker| lower.contains(marker))
    }

    pub fn is_internal_frame(&self, frame: &str) -> bool {
        let lower = frame.to_lowercase();
        self.internal_frames
            .iter()
            .any(|fragment| lower.contains(fragment))
    }

    /// Return the first input-contract phrase found in `text`
    pub fn input_contract_match(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.input_contract
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .map(|phrase| phrase.as_str())
    }
}

/// Raw TOML configuration for a language
#[derive(Debug, Deserialize)]
struct RawLanguageConfig {
    family: LanguageFamily,
    extension: String,
    #[serde(default)]
    wrapper_offset: u32,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    user_files: Vec<String>,
    #[serde(default)]
    internal_frames: Vec<String>,
    #[serde(default)]
    input_contract: Vec<String>,
}

/// Global language table
static LANGUAGES: OnceLock<HashMap<String, LanguageConfig>> = OnceLock::new();

/// Parse a language table, registering every alias as its own key
pub fn parse_language_table(
    content: &str,
) -> Result<HashMap<String, LanguageConfig>, DiagnoseError> {
    let raw_configs: HashMap<String, RawLanguageConfig> = toml::from_str(content)?;
    let lowered = |items: Vec<String>| -> Vec<String> {
        items.into_iter().map(|s| s.to_lowercase()).collect()
    };

    let mut languages = HashMap::new();
    for (name, raw) in raw_configs {
        let user_files = lowered(raw.user_files);
        let pattern = if user_files.is_empty() {
            None
        } else {
            let pattern = user_file_pattern(&user_files).map_err(|source| {
                DiagnoseError::UserFilePattern {
                    language: name.clone(),
                    source,
                }
            })?;
            Some(pattern)
        };

        let config = LanguageConfig {
            name: name.to_lowercase(),
            family: raw.family,
            extension: raw.extension,
            wrapper_offset: raw.wrapper_offset,
            user_files,
            internal_frames: lowered(raw.internal_frames),
            input_contract: lowered(raw.input_contract),
            user_file_pattern: pattern,
        };

        for alias in raw.aliases {
            languages.insert(alias.to_lowercase(), config.clone());
        }
        languages.insert(name.to_lowercase(), config);
    }

    Ok(languages)
}

/// Initialize the language table from a file, or the embedded table when `path` is None
pub fn init_languages(path: Option<&Path>) -> anyhow::Result<()> {
    let languages = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read language table {:?}", path))?;
            parse_language_table(&content)
                .with_context(|| format!("Failed to parse language table {:?}", path))?
        }
        None => parse_language_table(EMBEDDED_LANGUAGES)
            .context("Failed to parse embedded language table")?,
    };

    LANGUAGES
        .set(languages)
        .map_err(|_| DiagnoseError::LanguagesAlreadyInitialized)?;

    Ok(())
}

fn table() -> &'static HashMap<String, LanguageConfig> {
    LANGUAGES.get_or_init(|| {
        parse_language_table(EMBEDDED_LANGUAGES).unwrap_or_else(|e| {
            warn!("Embedded language table is invalid, using generic rules: {}", e);
            HashMap::new()
        })
    })
}

/// Get language configuration by language name or alias
pub fn get_language_config(language: &str) -> Option<&'static LanguageConfig> {
    table().get(&language.trim().to_lowercase())
}

/// Get the language configuration, falling back to generic rules
pub fn resolve_language(language: &str) -> Cow<'static, LanguageConfig> {
    match get_language_config(language) {
        Some(config) => Cow::Borrowed(config),
        None => Cow::Owned(LanguageConfig::generic(language)),
    }
}

/// Get all supported language names (including aliases)
pub fn get_supported_languages() -> Vec<String> {
    let mut names: Vec<String> = table().keys().cloned().collect();
    names.sort();
    names
}
