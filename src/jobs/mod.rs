pub mod diagnose;
pub mod run_report;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DiagnoseConfig;
use crate::jobs::diagnose::{process_diagnose_job, DiagnoseJob};
use crate::jobs::run_report::{process_run_report_job, RunReportJob};
use crate::redis_manager::keys;

/// Worker job enum - represents different types of jobs the worker can process
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum WorkerJob {
    /// Classify one raw error
    #[serde(rename = "diagnose")]
    Diagnose(DiagnoseJob),
    /// Annotate the test results of one run
    #[serde(rename = "run_report")]
    RunReport(RunReportJob),
}

impl WorkerJob {
    /// Identifier the result is stored under
    pub fn id(&self) -> &str {
        match self {
            WorkerJob::Diagnose(job) => &job.request_id,
            WorkerJob::RunReport(job) => &job.run_id,
        }
    }
}

/// Destination for serialized job results
#[async_trait]
pub trait ResultSink: Send {
    async fn store_result(&mut self, key: &str, channel: Option<&str>, json: &str)
        -> Result<()>;
}

pub fn result_key(id: &str) -> String {
    format!("{}{}", keys::DIAGNOSE_RESULT_PREFIX, id)
}

/// Process one job and hand its result to the sink
pub async fn handle_job<S>(job: WorkerJob, config: &DiagnoseConfig, sink: &mut S) -> Result<()>
where
    S: ResultSink + ?Sized,
{
    let key = result_key(job.id());

    let json = match &job {
        WorkerJob::Diagnose(job) => {
            info!(
                "Processing diagnose job: request_id={}, language={}",
                job.request_id, job.language
            );
            serde_json::to_string(&process_diagnose_job(job, config))?
        }
        WorkerJob::RunReport(job) => {
            info!(
                "Processing run report: run_id={}, language={}, tests={}",
                job.run_id,
                job.language,
                job.results.len()
            );
            let result = process_run_report_job(job, config);
            info!("Run {} verdict: {}", result.run_id, result.verdict);
            serde_json::to_string(&result)?
        }
    };

    sink.store_result(&key, Some(keys::DIAGNOSE_RESULT_CHANNEL), &json)
        .await
}
