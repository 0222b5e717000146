//! Caller-driven wait for a fine-tuning job to finish.
//!
//! [`await_completion`] polls [`ModelGateway::get_status`] at a fixed interval
//! until the job reaches a terminal status. The caller bounds the wait with
//! [`PollOptions::timeout`] and cancels by dropping the returned future.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::gateway::{GatewayError, ModelGateway};
use crate::types::FineTuneJob;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// `None` waits until the job finishes, however long that takes.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    #[error("fine-tune job {job_id} did not finish within {waited:?}")]
    TimedOut { job_id: String, waited: Duration },
}

/// Poll until `job_id` is `succeeded` or `failed` and return the final job.
///
/// A provider error ends the wait immediately; there is no retry. A zero
/// interval is rejected with [`PollError::InvalidInterval`].
pub async fn await_completion<G: ModelGateway>(
    gateway: &G,
    job_id: &str,
    options: PollOptions,
) -> Result<FineTuneJob, PollError> {
    if options.interval.is_zero() {
        return Err(PollError::InvalidInterval);
    }
    info!(fine_tune_id = job_id, interval = ?options.interval, "Waiting for fine-tuning job");

    let poll = poll_until_terminal(gateway, job_id, options.interval);
    match options.timeout {
        None => poll.await,
        Some(limit) => tokio::time::timeout(limit, poll)
            .await
            .map_err(|_| PollError::TimedOut {
                job_id: job_id.to_string(),
                waited: limit,
            })?,
    }
}

async fn poll_until_terminal<G: ModelGateway>(
    gateway: &G,
    job_id: &str,
    interval: Duration,
) -> Result<FineTuneJob, PollError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let job = gateway.get_status(job_id).await?;
        if job.status.is_terminal() {
            info!(fine_tune_id = job_id, status = %job.status, "Fine-tuning job finished");
            return Ok(job);
        }
        info!(
            fine_tune_id = job_id,
            status = %job.status,
            next_check_in = ?interval,
            "Fine-tuning job still in progress"
        );
    }
}
