//! Error types for the diagnostics worker plumbing
//!
//! The classifier itself never fails. These errors cover configuration
//! values and the language table.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("Unknown verbosity level: {0}")]
    UnknownVerbosity(String),

    #[error("Unknown line mapping policy: {0}")]
    UnknownLineMapping(String),

    #[error("Invalid language table: {0}")]
    LanguageTable(#[from] toml::de::Error),

    #[error("Invalid user file markers for {language}: {source}")]
    UserFilePattern {
        language: String,
        #[source]
        source: regex::Error,
    },

    #[error("Languages already initialized")]
    LanguagesAlreadyInitialized,
}
