//! Polling for queued server-side tasks.

use std::future::Future;
use std::time::Duration;

use bridge_traits::time::Timer;
use tracing::{debug, info};

use crate::envelope::ResponseEnvelope;
use crate::error::{ApiError, Result};
use crate::models::{TaskState, TaskStatus};

/// How often and how long to poll a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

/// Poll `fetch` until the task is `done` or `error`, or the server stops
/// answering with a status record.
///
/// The last envelope is returned as-is, so a failed envelope (for example an
/// expired task id) reaches the caller for classification.
pub(crate) async fn poll_task<F, Fut>(
    timer: &dyn Timer,
    task_id: &str,
    policy: PollPolicy,
    mut fetch: F,
) -> Result<ResponseEnvelope<TaskStatus>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ResponseEnvelope<TaskStatus>>>,
{
    let mut last_state = TaskState::Queued;

    for attempt in 1..=policy.max_attempts {
        let envelope = fetch().await?;

        match envelope.data.as_ref() {
            Some(status) if envelope.is_success() && !status.status.is_terminal() => {
                debug!(task_id, attempt, state = status.status.as_str(), "Task pending");
                last_state = status.status.clone();
            }
            _ => {
                info!(task_id, attempt, "Task polling finished");
                return Ok(envelope);
            }
        }

        if attempt < policy.max_attempts {
            timer.sleep(policy.interval).await;
        }
    }

    Err(ApiError::TaskTimedOut {
        task_id: task_id.to_string(),
        state: last_state.as_str().to_string(),
        attempts: policy.max_attempts,
    })
}
