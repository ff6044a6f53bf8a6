// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ValidationError;
use thiserror::Error;

/// Terminal failure of a dispatched job.
///
/// Every job resolves to exactly one `Ok(JobResult)` or one of these.
/// Only [`DispatchError::RemoteUnavailable`] is recoverable, and only once:
/// the fallback controller consumes it and reruns the job locally.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Request rejected before any path was attempted.
    #[error("Invalid job request: {0}")]
    Validation(#[from] ValidationError),

    /// Transport failure, rejected submission or exhausted polling.
    #[error("Remote worker unavailable: {0}")]
    RemoteUnavailable(String),

    /// Worker accepted the job and then reported `status: error`.
    #[error("Remote processing failed: {0}")]
    RemoteProcessingFailure(String),

    /// Sandboxed engine could not be loaded.
    #[error("Local engine unavailable: {0}")]
    LocalEngineUnavailable(String),

    /// Local transform failed; the engine stays usable.
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Remote path failed and the engine then failed to load on fallback.
    #[error("Remote worker unavailable ({remote}) and local fallback failed: {local}")]
    FallbackFailed {
        remote: String,
        local: Box<DispatchError>,
    },

    /// Caller abandoned the job.
    #[error("Job was cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Short machine-friendly label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "validation",
            DispatchError::RemoteUnavailable(_) => "remote_unavailable",
            DispatchError::RemoteProcessingFailure(_) => "remote_processing_failure",
            DispatchError::LocalEngineUnavailable(_) => "local_engine_unavailable",
            DispatchError::Processing(_) => "processing",
            DispatchError::FallbackFailed { .. } => "fallback_failed",
            DispatchError::Cancelled => "cancelled",
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
