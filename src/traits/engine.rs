// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boundary between the local adapter and a sandboxed media engine.
//!
//! Loading is expensive and happens once per process through an
//! [`EngineLoader`]. Every job then opens its own [`EngineWorkspace`], a
//! private scratch filesystem, so concurrent jobs never see each other's
//! input or output files.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::EngineResult;

/// Shared handle to a loaded engine.
pub type EngineHandle = Arc<dyn MediaEngine>;

#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Load and compile the engine. Errors here are fatal for the local path.
    async fn load(&self) -> EngineResult<EngineHandle>;

    /// Human-readable identifier, e.g. the module path.
    fn name(&self) -> &str;
}

pub trait MediaEngine: Send + Sync {
    /// Create an empty workspace for one job.
    fn open_workspace(&self) -> EngineResult<Box<dyn EngineWorkspace>>;

    fn name(&self) -> &str;
}

/// Per-job scratch area inside the engine sandbox.
///
/// File names are plain names (no directory components). The workspace is
/// discarded when dropped.
#[async_trait]
pub trait EngineWorkspace: Send {
    /// Path of `name` as seen from inside the engine, for use in arguments.
    fn path_of(&self, name: &str) -> String;

    async fn write_file(&mut self, name: &str, contents: &[u8]) -> EngineResult<()>;

    /// Run the engine once with `args` (program name excluded).
    async fn execute(&mut self, args: Vec<String>) -> EngineResult<()>;

    async fn read_file(&mut self, name: &str) -> EngineResult<Vec<u8>>;
}
