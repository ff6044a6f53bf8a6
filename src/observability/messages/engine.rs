// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the sandboxed processing engine.
//!
//! This module contains message types for logging events related to:
//! * Engine module loading and validation
//! * Reuse of an already loaded engine
//! * Local transform lifecycle and performance

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Engine load requested.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EngineLoadStarted<'a> {
    pub engine: &'a str,
}

impl Display for EngineLoadStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loading processing engine {}", self.engine)
    }
}

impl StructuredLog for EngineLoadStarted<'_> {
    fn log(&self) {
        tracing::info!(engine = self.engine, "{}", self);
    }
}

/// Engine module compiled and ready.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use media_dispatch::observability::messages::engine::EngineLoaded;
/// use std::time::Duration;
///
/// let msg = EngineLoaded {
///     engine: "engines/ffmpeg.wasm",
///     size_bytes: 4096,
///     duration: Duration::from_millis(120),
/// };
///
/// assert!(msg.to_string().contains("4096 bytes"));
/// ```
pub struct EngineLoaded<'a> {
    pub engine: &'a str,
    pub size_bytes: usize,
    pub duration: Duration,
}

impl Display for EngineLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded processing engine {} ({} bytes) in {:?}",
            self.engine, self.size_bytes, self.duration
        )
    }
}

impl StructuredLog for EngineLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            engine = self.engine,
            size_bytes = self.size_bytes,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Engine could not be loaded.
///
/// # Log Level
/// `error!` - Local path unavailable
pub struct EngineLoadFailed<'a> {
    pub engine: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EngineLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load processing engine {}: {}",
            self.engine, self.error
        )
    }
}

impl StructuredLog for EngineLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(engine = self.engine, error = %self.error, "{}", self);
    }
}

/// Already loaded engine handed out again.
///
/// # Log Level
/// `debug!` - Detailed execution tracing
pub struct EngineReused<'a> {
    pub engine: &'a str,
}

impl Display for EngineReused<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reusing loaded processing engine {}", self.engine)
    }
}

impl StructuredLog for EngineReused<'_> {
    fn log(&self) {
        tracing::debug!(engine = self.engine, "{}", self);
    }
}

/// Local transform started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TransformStarted<'a> {
    pub tool: &'a str,
    pub input_size: usize,
    pub args: &'a [String],
}

impl Display for TransformStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running {} transform on {} bytes: ffmpeg {}",
            self.tool,
            self.input_size,
            self.args.join(" ")
        )
    }
}

impl StructuredLog for TransformStarted<'_> {
    fn log(&self) {
        tracing::info!(
            tool = self.tool,
            input_size = self.input_size,
            args = ?self.args,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "transform",
            span_name = name,
            tool = self.tool,
            input_size = self.input_size,
        )
    }
}

/// Local transform finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TransformCompleted<'a> {
    pub tool: &'a str,
    pub input_size: usize,
    pub output_size: usize,
    pub duration: Duration,
}

impl Display for TransformCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} transform completed: {} -> {} bytes in {:?}",
            self.tool, self.input_size, self.output_size, self.duration
        )
    }
}

impl StructuredLog for TransformCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            tool = self.tool,
            input_size = self.input_size,
            output_size = self.output_size,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Local transform failed; the engine stays loaded.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TransformFailed<'a> {
    pub tool: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for TransformFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} transform failed: {}", self.tool, self.error)
    }
}

impl StructuredLog for TransformFailed<'_> {
    fn log(&self) {
        tracing::error!(tool = self.tool, error = %self.error, "{}", self);
    }
}
