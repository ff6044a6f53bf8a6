// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for job lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Job acceptance and routing
//! * Fallback from the remote worker to the local engine
//! * State transitions and terminal outcomes

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Job accepted by the dispatcher.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobStarted<'a> {
    pub job_id: u64,
    pub tool: &'a str,
    pub size_bytes: u64,
}

impl Display for JobStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} started: tool={}, {} bytes",
            self.job_id, self.tool, self.size_bytes
        )
    }
}

impl StructuredLog for JobStarted<'_> {
    fn log(&self) {
        tracing::info!(
            job_id = self.job_id,
            tool = self.tool,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job",
            span_name = name,
            job_id = self.job_id,
            tool = self.tool,
        )
    }
}

/// Execution path chosen for a job.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use media_dispatch::observability::messages::dispatch::RouteSelected;
///
/// let msg = RouteSelected {
///     job_id: 1,
///     decision: "local",
///     size_bytes: 80 * 1024 * 1024,
///     threshold_bytes: 50 * 1024 * 1024,
/// };
///
/// assert!(msg.to_string().contains("local"));
/// ```
pub struct RouteSelected<'a> {
    pub job_id: u64,
    pub decision: &'a str,
    pub size_bytes: u64,
    pub threshold_bytes: u64,
}

impl Display for RouteSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} routed {}: {} bytes against a {} byte threshold",
            self.job_id, self.decision, self.size_bytes, self.threshold_bytes
        )
    }
}

impl StructuredLog for RouteSelected<'_> {
    fn log(&self) {
        tracing::info!(
            job_id = self.job_id,
            decision = self.decision,
            size_bytes = self.size_bytes,
            threshold_bytes = self.threshold_bytes,
            "{}", self
        );
    }
}

/// Remote path gave up and the job is being rerun locally.
///
/// # Log Level
/// `warn!` - Degraded operation, job continues
pub struct FallbackTriggered<'a> {
    pub job_id: u64,
    pub reason: &'a str,
}

impl Display for FallbackTriggered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} falling back to the local engine: {}",
            self.job_id, self.reason
        )
    }
}

impl StructuredLog for FallbackTriggered<'_> {
    fn log(&self) {
        tracing::warn!(job_id = self.job_id, reason = self.reason, "{}", self);
    }
}

/// Job state machine moved to a new state.
///
/// # Log Level
/// `debug!` - Detailed lifecycle tracing
pub struct StateTransition {
    pub job_id: u64,
    pub from: &'static str,
    pub to: &'static str,
}

impl Display for StateTransition {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} state {} -> {}", self.job_id, self.from, self.to)
    }
}

impl StructuredLog for StateTransition {
    fn log(&self) {
        tracing::debug!(job_id = self.job_id, from = self.from, to = self.to, "{}", self);
    }
}

/// Transition rejected by the job state machine.
///
/// # Log Level
/// `error!` - Internal invariant violated
pub struct InvalidStateTransition {
    pub job_id: u64,
    pub from: &'static str,
    pub to: &'static str,
}

impl Display for InvalidStateTransition {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} rejected state transition {} -> {}",
            self.job_id, self.from, self.to
        )
    }
}

impl StructuredLog for InvalidStateTransition {
    fn log(&self) {
        tracing::error!(job_id = self.job_id, from = self.from, to = self.to, "{}", self);
    }
}

/// Job produced a result.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobCompleted<'a> {
    pub job_id: u64,
    pub origin: &'a str,
    pub filename: &'a str,
    pub duration: Duration,
}

impl Display for JobCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} completed {}: {} in {:?}",
            self.job_id, self.origin, self.filename, self.duration
        )
    }
}

impl StructuredLog for JobCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            job_id = self.job_id,
            origin = self.origin,
            filename = self.filename,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Job resolved with an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct JobFailed<'a> {
    pub job_id: u64,
    pub kind: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for JobFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} failed ({}): {}", self.job_id, self.kind, self.error)
    }
}

impl StructuredLog for JobFailed<'_> {
    fn log(&self) {
        tracing::error!(
            job_id = self.job_id,
            kind = self.kind,
            error = %self.error,
            "{}", self
        );
    }
}

/// Caller cancelled the job.
///
/// # Log Level
/// `info!` - Expected operational event
pub struct JobCancelled {
    pub job_id: u64,
    pub state: &'static str,
}

impl Display for JobCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} cancelled while {}", self.job_id, self.state)
    }
}

impl StructuredLog for JobCancelled {
    fn log(&self) {
        tracing::info!(job_id = self.job_id, state = self.state, "{}", self);
    }
}
