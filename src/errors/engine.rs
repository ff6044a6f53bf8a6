// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the sandboxed processing engine boundary.

use thiserror::Error;

/// Errors raised by an engine loader, engine, or engine workspace.
///
/// The local adapter maps [`EngineError::Load`] to a fatal
/// `LocalEngineUnavailable` and everything else to a job-scoped
/// `ProcessingError`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine binary missing, invalid or failed to compile.
    #[error("Engine load failed: {0}")]
    Load(String),

    /// File I/O inside the job workspace.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Instantiation or trap inside the engine.
    #[error("Engine execution failed: {0}")]
    Execution(String),

    /// Engine ran to completion but reported a non-zero exit code.
    #[error("Engine exited with status {0}")]
    ExitStatus(i32),

    /// Expected output file was not written by the engine.
    #[error("Output file '{0}' was not produced")]
    MissingOutput(String),

    /// Workspace file names must be plain names without path separators.
    #[error("Invalid workspace file name: '{0}'")]
    InvalidFileName(String),

    /// Blocking task running the engine panicked or was cancelled.
    #[error("Engine task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type EngineResult<T> = Result<T, EngineError>;
