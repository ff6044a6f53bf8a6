// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::config::RemoteConfig;
use crate::errors::{DispatchError, DispatchResult};
use crate::job::{JobResult, RemoteJobHandle, RemoteStatus, ValidatedRequest};
use crate::observability::messages::{remote::*, StructuredLog};
use crate::traits::RemoteWorker;

/// Cadence and limits of the status polling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollingPolicy {
    pub interval: Duration,
    /// Total polls before the job is abandoned.
    pub max_attempts: u32,
    /// Transport failures in a row before the job is abandoned.
    pub max_consecutive_errors: u32,
}

impl From<&RemoteConfig> for PollingPolicy {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
            max_consecutive_errors: config.max_consecutive_poll_errors,
        }
    }
}

/// Drives one job through the remote worker: a single submission, then a
/// bounded polling loop until the worker reports a terminal status.
pub struct RemoteJobRunner {
    worker: Arc<dyn RemoteWorker>,
    policy: PollingPolicy,
}

impl RemoteJobRunner {
    pub fn new(worker: Arc<dyn RemoteWorker>, policy: PollingPolicy) -> Self {
        Self { worker, policy }
    }

    pub fn worker(&self) -> Arc<dyn RemoteWorker> {
        Arc::clone(&self.worker)
    }

    pub async fn submit(&self, request: &ValidatedRequest) -> DispatchResult<RemoteJobHandle> {
        self.worker.submit(request).await
    }

    /// Poll `handle` until it is terminal.
    ///
    /// * `completed` resolves to a remote [`JobResult`]
    /// * `error` resolves to `RemoteProcessingFailure`
    /// * running out of attempts, or too many transport failures in a row,
    ///   resolves to `RemoteUnavailable`
    ///
    /// A handle that is already terminal, e.g. from a worker that finished
    /// during submission, resolves without polling.
    pub async fn await_completion(&self, handle: RemoteJobHandle) -> DispatchResult<JobResult> {
        if let Some(outcome) = settle(&handle) {
            return outcome;
        }

        let mut current = handle;
        let mut consecutive_errors = 0;

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            match self.worker.poll(&current).await {
                Ok(next) => {
                    consecutive_errors = 0;
                    current = next;
                    PollResult {
                        remote_id: &current.id,
                        attempt,
                        status: status_label(current.status),
                    }
                    .log();
                }
                Err(e) => {
                    consecutive_errors += 1;
                    PollFailed {
                        remote_id: &current.id,
                        consecutive_errors,
                        max_consecutive_errors: self.policy.max_consecutive_errors,
                        error: &e,
                    }
                    .log();

                    if consecutive_errors >= self.policy.max_consecutive_errors {
                        let reason = format!("{} consecutive status polls failed: {}", consecutive_errors, e);
                        PollingExhausted {
                            remote_id: &current.id,
                            attempts: attempt,
                            reason: &reason,
                        }
                        .log();
                        return Err(DispatchError::RemoteUnavailable(reason));
                    }
                    continue;
                }
            }

            if let Some(outcome) = settle(&current) {
                return outcome;
            }
        }

        let reason = format!(
            "no terminal status after {} polls",
            self.policy.max_attempts
        );
        PollingExhausted {
            remote_id: &current.id,
            attempts: self.policy.max_attempts,
            reason: &reason,
        }
        .log();
        Err(DispatchError::RemoteUnavailable(reason))
    }
}

/// Outcome of a terminal handle; `None` while the worker is still processing.
fn settle(handle: &RemoteJobHandle) -> Option<DispatchResult<JobResult>> {
    match handle.status {
        RemoteStatus::Processing => None,
        RemoteStatus::Completed => Some(
            handle
                .result_ref
                .clone()
                .map(JobResult::remote)
                .ok_or_else(|| {
                    DispatchError::RemoteProcessingFailure(
                        "worker completed without a result reference".to_string(),
                    )
                }),
        ),
        RemoteStatus::Error => Some(Err(DispatchError::RemoteProcessingFailure(
            handle
                .message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ))),
    }
}

fn status_label(status: RemoteStatus) -> &'static str {
    match status {
        RemoteStatus::Processing => "processing",
        RemoteStatus::Completed => "completed",
        RemoteStatus::Error => "error",
    }
}
