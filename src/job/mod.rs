// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Job data model shared by both execution paths.
//!
//! A caller builds a [`JobRequest`], the dispatcher validates it into a
//! [`ValidatedRequest`], and whichever path runs it produces one immutable
//! [`JobResult`]. Remote progress is tracked through a [`RemoteJobHandle`]
//! that only polling responses ever mutate.

pub mod media;
pub mod state;
pub mod tool;

pub use media::Container;
pub use state::{JobState, JobStatus};
pub use tool::{QualityTier, Rotation, ToolParams, ToolType, WatermarkPreset, WatermarkRegion};

use crate::errors::ValidationError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One request to transform a media file with a single tool.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Source media bytes; cheap to clone, so a fallback rerun reuses them.
    pub source: Bytes,
    /// Original file name, used for container detection and upload naming.
    pub source_name: Option<String>,
    pub tool: ToolType,
    /// Raw tool options as the caller supplied them.
    pub options: HashMap<String, String>,
}

impl JobRequest {
    pub fn new(tool: ToolType, source: impl Into<Bytes>) -> Self {
        Self {
            source: source.into(),
            source_name: None,
            tool,
            options: HashMap::new(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Payload size, known without reading the content.
    pub fn size(&self) -> u64 {
        self.source.len() as u64
    }

    pub fn validate(self) -> Result<ValidatedRequest, ValidationError> {
        if self.source.is_empty() {
            return Err(ValidationError::EmptySource);
        }
        let params = ToolParams::parse(self.tool, &self.options)?;
        let container = Container::sniff(&self.source, self.source_name.as_deref());
        Ok(ValidatedRequest {
            request: self,
            params,
            container,
        })
    }
}

/// A request whose options passed validation, with its typed parameters.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub request: JobRequest,
    pub params: ToolParams,
    /// Container detected from the source bytes.
    pub container: Container,
}

impl ValidatedRequest {
    pub fn tool(&self) -> ToolType {
        self.request.tool
    }

    /// File name used when uploading the source to the remote worker.
    pub fn upload_name(&self) -> String {
        self.request
            .source_name
            .clone()
            .unwrap_or_else(|| format!("input.{}", self.container.extension()))
    }
}

/// Where a job runs. Computed once per job; fallback may only move it to `Local`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionDecision {
    Local,
    Remote,
}

impl fmt::Display for ExecutionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionDecision::Local => f.write_str("local"),
            ExecutionDecision::Remote => f.write_str("remote"),
        }
    }
}

/// Which path produced a [`JobResult`].
pub type Origin = ExecutionDecision;

/// Result content: bytes for local results, a worker-side reference for remote ones.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Bytes(Bytes),
    Reference(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub payload: ResultPayload,
    pub filename: String,
    pub origin: Origin,
    pub media_type: String,
}

impl JobResult {
    pub fn local(bytes: impl Into<Bytes>, filename: String, media_type: &str) -> Self {
        Self {
            payload: ResultPayload::Bytes(bytes.into()),
            filename,
            origin: ExecutionDecision::Local,
            media_type: media_type.to_string(),
        }
    }

    pub fn remote(result_ref: String) -> Self {
        let media_type = media::media_type_for_filename(&result_ref).to_string();
        Self {
            payload: ResultPayload::Reference(result_ref.clone()),
            filename: result_ref,
            origin: ExecutionDecision::Remote,
            media_type,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Processing,
    Completed,
    Error,
}

/// Worker-side job tracked between submission and a terminal status.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteJobHandle {
    /// Opaque token assigned by the worker.
    pub id: String,
    pub status: RemoteStatus,
    /// Artifact name, only set once `status` is `Completed`.
    pub result_ref: Option<String>,
    /// Failure description, only set once `status` is `Error`.
    pub message: Option<String>,
}

impl RemoteJobHandle {
    pub fn accepted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: RemoteStatus::Processing,
            result_ref: None,
            message: None,
        }
    }

    pub fn completed(&self, result_ref: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            status: RemoteStatus::Completed,
            result_ref: Some(result_ref.into()),
            message: None,
        }
    }

    pub fn failed(&self, message: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            status: RemoteStatus::Error,
            result_ref: None,
            message: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != RemoteStatus::Processing
    }
}
