// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observable lifecycle of a dispatched job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one job.
///
/// `RemoteFailed` is the only state that can move onto the local path, and
/// it does so at most once per job. `Completed` and `Failed` are terminal.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Routed,
    RemoteSubmitted,
    RemotePolling,
    RemoteCompleted,
    RemoteFailed,
    LocalRunning,
    LocalCompleted,
    LocalFailed,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;

        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }

        matches!(
            (self, next),
            (Created, Routed)
                | (Routed, RemoteSubmitted)
                | (Routed, RemoteFailed)
                | (Routed, LocalRunning)
                | (RemoteSubmitted, RemotePolling)
                | (RemoteSubmitted, RemoteCompleted)
                | (RemoteSubmitted, RemoteFailed)
                | (RemotePolling, RemoteCompleted)
                | (RemotePolling, RemoteFailed)
                | (RemoteFailed, LocalRunning)
                | (RemoteCompleted, Completed)
                | (LocalRunning, LocalCompleted)
                | (LocalRunning, LocalFailed)
                | (LocalCompleted, Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::Routed => "routed",
            JobState::RemoteSubmitted => "remote_submitted",
            JobState::RemotePolling => "remote_polling",
            JobState::RemoteCompleted => "remote_completed",
            JobState::RemoteFailed => "remote_failed",
            JobState::LocalRunning => "local_running",
            JobState::LocalCompleted => "local_completed",
            JobState::LocalFailed => "local_failed",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot published to observers whenever the job changes state.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub state: JobState,
    /// Human-readable detail, e.g. the fallback reason or failure message.
    pub message: Option<String>,
}

impl JobStatus {
    pub fn new(state: JobState) -> Self {
        Self {
            state,
            message: None,
        }
    }

    pub fn with_message(state: JobState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: Some(message.into()),
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::new(JobState::Created)
    }
}
