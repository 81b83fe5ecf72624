/// Long-running job polling
///
/// Drives the submit → poll-until-done → fetch-result protocol for one
/// generation job. The wait between polls goes through an injectable
/// `Sleeper` and the loop can be bounded by `max_attempts`, so tests run
/// the whole protocol deterministically without real delays.
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

use crate::client::GenerationBackend;
use crate::error::GenerationError;
use crate::planner::RequestPayload;

/// Polling cadence and bound for a single job.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the job reports done (the reference behavior).
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Injectable wait between polls.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper over the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs one generation job to completion: submit the payload, poll the
/// operation until it reports done, then fetch the media exactly once. A
/// submission failure is terminal; there is no partial job to clean up.
pub async fn run_job<B: GenerationBackend + ?Sized>(
    backend: &B,
    credential: &str,
    payload: &RequestPayload,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> Result<Vec<u8>, GenerationError> {
    let handle = backend.create_video_job(credential, payload).await?;
    info!("submitted {} job as {}", payload.mode, handle.0);

    let mut attempts = 0u32;
    let poll = loop {
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(GenerationError::DeadlineExceeded(attempts));
            }
        }
        sleeper.sleep(policy.interval).await;
        attempts += 1;
        let poll = backend.poll_video_job(credential, &handle).await?;
        debug!("poll {} of {}: done={}", attempts, handle.0, poll.done);
        if poll.done {
            break poll;
        }
    };

    match poll.media_uri {
        Some(uri) => backend.fetch_media(credential, &uri).await,
        None => Err(GenerationError::EmptyResult),
    }
}
