// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for remote worker submission and polling.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Multipart upload about to be sent.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SubmissionStarted<'a> {
    pub worker: &'a str,
    pub endpoint: &'a str,
    pub size_bytes: u64,
}

impl Display for SubmissionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Submitting {} bytes to {} worker at {}",
            self.size_bytes, self.worker, self.endpoint
        )
    }
}

impl StructuredLog for SubmissionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            worker = self.worker,
            endpoint = self.endpoint,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }
}

/// Worker accepted the job and assigned it an id.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SubmissionAccepted<'a> {
    pub worker: &'a str,
    pub remote_id: &'a str,
}

impl Display for SubmissionAccepted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} accepted job as '{}'", self.worker, self.remote_id)
    }
}

impl StructuredLog for SubmissionAccepted<'_> {
    fn log(&self) {
        tracing::info!(worker = self.worker, remote_id = self.remote_id, "{}", self);
    }
}

/// Submission failed before the worker accepted the job.
///
/// # Log Level
/// `warn!` - Recoverable through fallback
pub struct SubmissionRejected<'a> {
    pub worker: &'a str,
    pub reason: &'a str,
}

impl Display for SubmissionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} rejected submission: {}", self.worker, self.reason)
    }
}

impl StructuredLog for SubmissionRejected<'_> {
    fn log(&self) {
        tracing::warn!(worker = self.worker, reason = self.reason, "{}", self);
    }
}

/// One status poll returned.
///
/// # Log Level
/// `debug!` - Emitted every poll interval
pub struct PollResult<'a> {
    pub remote_id: &'a str,
    pub attempt: u32,
    pub status: &'a str,
}

impl Display for PollResult<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Poll {} for remote job '{}': {}",
            self.attempt, self.remote_id, self.status
        )
    }
}

impl StructuredLog for PollResult<'_> {
    fn log(&self) {
        tracing::debug!(
            remote_id = self.remote_id,
            attempt = self.attempt,
            status = self.status,
            "{}", self
        );
    }
}

/// A status poll failed at the transport level.
///
/// # Log Level
/// `warn!` - Tolerated until the consecutive error limit
pub struct PollFailed<'a> {
    pub remote_id: &'a str,
    pub consecutive_errors: u32,
    pub max_consecutive_errors: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for PollFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Poll for remote job '{}' failed ({}/{}): {}",
            self.remote_id, self.consecutive_errors, self.max_consecutive_errors, self.error
        )
    }
}

impl StructuredLog for PollFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            remote_id = self.remote_id,
            consecutive_errors = self.consecutive_errors,
            max_consecutive_errors = self.max_consecutive_errors,
            error = %self.error,
            "{}", self
        );
    }
}

/// Polling gave up without a terminal status.
///
/// # Log Level
/// `warn!` - Recoverable through fallback
pub struct PollingExhausted<'a> {
    pub remote_id: &'a str,
    pub attempts: u32,
    pub reason: &'a str,
}

impl Display for PollingExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stopped polling remote job '{}' after {} attempts: {}",
            self.remote_id, self.attempts, self.reason
        )
    }
}

impl StructuredLog for PollingExhausted<'_> {
    fn log(&self) {
        tracing::warn!(
            remote_id = self.remote_id,
            attempts = self.attempts,
            reason = self.reason,
            "{}", self
        );
    }
}
