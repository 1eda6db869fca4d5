use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};

use diagnose::config::{get_config, init_config};
use diagnose::jobs::handle_job;
use diagnose::languages::{get_supported_languages, init_languages};
use diagnose::redis_manager::RedisManager;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("diagnose=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    // Load language table (embedded unless overridden)
    let languages_path = std::env::var("LANGUAGES_CONFIG").ok().map(PathBuf::from);
    init_languages(languages_path.as_deref())?;
    match &languages_path {
        Some(path) => info!("Loaded language table from {:?}", path),
        None => info!("Loaded embedded language table"),
    }
    info!("Supported languages: {}", get_supported_languages().join(", "));

    init_config()?;
    let config = get_config();
    info!(
        "Diagnose config: queue={}, result_ttl={}s, verbosity={:?}, line_mapping={:?}",
        config.queue, config.result_ttl_secs, config.verbosity, config.line_mapping
    );

    info!("Starting Diagnose Worker...");
    let mut redis = RedisManager::from_config(config).await?;

    info!("Waiting for jobs on {}...", redis.queue());

    loop {
        let job = redis.pop_job().await?;
        let job_id = job.id().to_string();

        if let Err(e) = handle_job(job, config, &mut redis).await {
            error!("Failed to process job {}: {:#}", job_id, e);
        }
    }
}
