use serde::{Deserialize, Serialize};
use tracing::debug;

use super::diagnose::Diagnosis;
use crate::config::DiagnoseConfig;
use crate::parser::{ErrorCategory, Verbosity};
use crate::verdict::{TestResult, Verdict};

/// Annotate every errored test of one run and summarize a verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReportJob {
    pub run_id: String,
    pub language: String,
    #[serde(default)]
    pub user_code_line_count: u32,
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub verbosity: Option<Verbosity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosedTestResult {
    #[serde(flatten)]
    pub result: TestResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReportResult {
    pub run_id: String,
    pub verdict: Verdict,
    pub results: Vec<DiagnosedTestResult>,
}

const TIMEOUT_TYPE: &str = "TimeoutError";

/// Overall verdict, strongest first: compile > timeout > runtime > wrong answer
pub fn summarize(results: &[DiagnosedTestResult]) -> Verdict {
    let diagnosed: Vec<&Diagnosis> = results.iter().filter_map(|r| r.diagnosis.as_ref()).collect();

    if diagnosed
        .iter()
        .any(|d| d.parsed.category == ErrorCategory::Syntax)
    {
        return Verdict::CompilationError;
    }
    if diagnosed.iter().any(|d| d.parsed.error_type == TIMEOUT_TYPE) {
        return Verdict::TimeLimitExceeded;
    }
    if !diagnosed.is_empty() {
        return Verdict::RuntimeError;
    }
    if results.iter().any(|r| r.result.passed == Some(false)) {
        return Verdict::WrongAnswer;
    }
    Verdict::Accepted
}

pub fn process_run_report_job(job: &RunReportJob, config: &DiagnoseConfig) -> RunReportResult {
    let verbosity = job.verbosity.unwrap_or(config.verbosity);

    let results: Vec<DiagnosedTestResult> = job
        .results
        .iter()
        .map(|test| {
            let diagnosis = test.error_text().map(|error| {
                Diagnosis::new(
                    error,
                    &job.language,
                    job.user_code_line_count,
                    verbosity,
                    config,
                )
            });
            DiagnosedTestResult {
                result: test.clone(),
                diagnosis,
            }
        })
        .collect();

    let verdict = summarize(&results);
    debug!(
        "Run {} summarized as {} over {} tests",
        job.run_id,
        verdict,
        results.len()
    );

    RunReportResult {
        run_id: job.run_id.clone(),
        verdict,
        results,
    }
}
