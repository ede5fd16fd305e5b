//! Registration poll: bridge between writing a workflow definition and
//! the scheduler actually knowing about it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::SchedulerApi;
use crate::error::SchedulerError;

/// Poll tuning. Bounded: the loop never blocks indefinitely.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationPoll {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RegistrationPoll {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(3),
        }
    }
}

/// Waits until the scheduler has registered `workflow_id`, unpausing it
/// if it came up paused.
///
/// Per attempt: not found → sleep `interval`, retry; found paused →
/// unpause, done; found running → done. After `max_attempts` misses the
/// poll fails with `RegistrationTimeout`. The sleep races `cancel`, so an
/// aborted caller stops issuing scheduler calls immediately.
pub async fn wait_for_registration(
    scheduler: &dyn SchedulerApi,
    workflow_id: &str,
    poll: &RegistrationPoll,
    cancel: &CancellationToken,
) -> Result<(), SchedulerError> {
    let attempts = poll.max_attempts.max(1);
    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            return Err(SchedulerError::Canceled);
        }

        match scheduler.get_status(workflow_id).await? {
            Some(status) => {
                if status.paused {
                    scheduler.set_paused(workflow_id, false).await?;
                    tracing::info!(
                        target: "syncflow.scheduler",
                        %workflow_id, attempt, "workflow registered paused; unpaused"
                    );
                } else {
                    tracing::debug!(
                        target: "syncflow.scheduler",
                        %workflow_id, attempt, "workflow registered"
                    );
                }
                return Ok(());
            }
            None => {
                tracing::debug!(
                    target: "syncflow.scheduler",
                    %workflow_id, attempt, "workflow not yet registered"
                );
            }
        }

        if attempt < attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SchedulerError::Canceled),
                _ = tokio::time::sleep(poll.interval) => {}
            }
        }
    }

    Err(SchedulerError::RegistrationTimeout {
        workflow_id: workflow_id.to_string(),
        attempts,
    })
}
