use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DiagnoseConfig;
use crate::parser::{format_error_output, parse_code_error_with, ParsedError, Verbosity};

/// Classify a single raw error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseJob {
    pub request_id: String,
    pub language: String,
    pub raw_error: String,
    /// Lines in the user's editor buffer; 0 when unknown
    #[serde(default)]
    pub user_code_line_count: u32,
    /// Overrides the worker's default verbosity
    #[serde(default)]
    pub verbosity: Option<Verbosity>,
}

/// A classified error together with its rendered text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub parsed: ParsedError,
    pub formatted: String,
}

impl Diagnosis {
    pub fn new(
        raw_error: &str,
        language: &str,
        user_code_line_count: u32,
        verbosity: Verbosity,
        config: &DiagnoseConfig,
    ) -> Self {
        let parsed = parse_code_error_with(
            raw_error,
            language,
            user_code_line_count,
            &config.parse_options(),
        );
        let formatted = format_error_output(&parsed, verbosity);
        Self { parsed, formatted }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseResult {
    pub request_id: String,
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
}

pub fn process_diagnose_job(job: &DiagnoseJob, config: &DiagnoseConfig) -> DiagnoseResult {
    let verbosity = job.verbosity.unwrap_or(config.verbosity);
    let diagnosis = Diagnosis::new(
        &job.raw_error,
        &job.language,
        job.user_code_line_count,
        verbosity,
        config,
    );

    debug!(
        "Diagnosed request {} as {} ({})",
        job.request_id, diagnosis.parsed.category, diagnosis.parsed.error_type
    );

    DiagnoseResult {
        request_id: job.request_id.clone(),
        diagnosis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorCategory;

    #[test]
    fn test_job_deserializes_with_optional_fields() {
        let json = r#"{"request_id": "r1", "language": "python", "raw_error": "x"}"#;
        let job: DiagnoseJob = serde_json::from_str(json).unwrap();

        assert_eq!(job.user_code_line_count, 0);
        assert!(job.verbosity.is_none());
    }

    #[test]
    fn test_result_shape() {
        let job = DiagnoseJob {
            request_id: "r7".to_string(),
            language: "python".to_string(),
            raw_error: "Traceback (most recent call last):\n  File \"/piston/jobs/1/file0.code\", line 2, in <module>\nNameError: name 'lenn' is not defined".to_string(),
            user_code_line_count: 4,
            verbosity: Some(Verbosity::Beginner),
        };
        let result = process_diagnose_job(&job, &DiagnoseConfig::default());

        assert_eq!(result.diagnosis.parsed.category, ErrorCategory::Runtime);
        assert_eq!(result.diagnosis.parsed.user_line, Some(2));
        assert!(result.diagnosis.formatted.starts_with("Your code stopped"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["request_id"], "r7");
        assert_eq!(json["parsed"]["type"], "NameError");
        assert!(json["formatted"].is_string());
    }
}
