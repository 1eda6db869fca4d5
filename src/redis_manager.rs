//! Redis Manager - Centralized Redis connection and operations
//!
//! This module handles all Redis-related operations including:
//! - Job queue operations (BLPOP)
//! - Result storage and publishing

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::config::DiagnoseConfig;
use crate::jobs::{ResultSink, WorkerJob};

/// Redis key constants
pub mod keys {
    /// Diagnose job queue key
    pub const DIAGNOSE_QUEUE: &str = "diagnose:queue";

    /// Diagnose result key prefix (for polling)
    pub const DIAGNOSE_RESULT_PREFIX: &str = "diagnose:result:";

    /// Diagnose result channel (for pub/sub)
    pub const DIAGNOSE_RESULT_CHANNEL: &str = "diagnose:results";
}

const RECONNECT_DELAY_SECS: u64 = 3;

/// Centralized Redis manager for all Redis operations
pub struct RedisManager {
    client: redis::Client,
    conn: MultiplexedConnection,
    queue: String,
    result_ttl_secs: u64,
}

impl RedisManager {
    /// Connect to Redis using the worker configuration
    pub async fn from_config(config: &DiagnoseConfig) -> Result<Self> {
        let client =
            redis::Client::open(config.redis_url.as_str()).context("Failed to create Redis client")?;

        let conn = get_connection_with_retry(&client).await?;
        info!("Connected to Redis at {}", config.redis_url);

        Ok(Self {
            client,
            conn,
            queue: config.queue.clone(),
            result_ttl_secs: config.result_ttl_secs,
        })
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Block and wait for the next job from the queue.
    ///
    /// This uses BLPOP to efficiently wait for jobs without polling.
    /// Automatically reconnects on connection failure. Malformed jobs are
    /// logged and skipped.
    pub async fn pop_job(&mut self) -> Result<WorkerJob> {
        loop {
            let result: Option<(String, String)> =
                match self.conn.blpop(self.queue.as_str(), 0.0).await {
                    Ok(res) => res,
                    Err(e) => {
                        warn!("Redis BLPOP failed: {}. Reconnecting...", e);
                        self.reconnect().await?;
                        continue;
                    }
                };

            if let Some((_, job_data)) = result {
                match serde_json::from_str::<WorkerJob>(&job_data) {
                    Ok(job) => return Ok(job),
                    Err(e) => {
                        warn!("Failed to parse job data: {}. Data: {}", e, job_data);
                        continue;
                    }
                }
            }
        }
    }

    /// Reconnect to Redis
    async fn reconnect(&mut self) -> Result<()> {
        self.conn = get_connection_with_retry(&self.client).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultSink for RedisManager {
    /// Store a result with the configured expiration and publish it to the
    /// channel for real-time subscribers.
    async fn store_result(
        &mut self,
        key: &str,
        channel: Option<&str>,
        json: &str,
    ) -> Result<()> {
        let ttl = self.result_ttl_secs;

        // Try to store, reconnect on failure
        if let Err(e) = self.conn.set_ex::<_, _, ()>(key, json, ttl).await {
            warn!("Failed to store result: {}. Reconnecting...", e);
            self.reconnect().await?;
            self.conn
                .set_ex::<_, _, ()>(key, json, ttl)
                .await
                .with_context(|| format!("Failed to store result at {}", key))?;
        }

        // Publish to channel (ignore errors as there may be no subscribers)
        if let Some(chan) = channel {
            let _ = self.conn.publish::<_, _, ()>(chan, json).await;
        }

        Ok(())
    }
}

/// Get a Redis connection with retry logic
async fn get_connection_with_retry(client: &redis::Client) -> Result<MultiplexedConnection> {
    loop {
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                warn!(
                    "Failed to connect to Redis: {}. Retrying in {} seconds...",
                    e, RECONNECT_DELAY_SECS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)).await;
            }
        }
    }
}
