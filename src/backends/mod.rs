// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution backends behind the dispatcher's trait seams.
//!
//! ## Remote Backend
//! HTTP client for the remote processing worker:
//! - **Submission**: multipart upload to the tool's endpoint
//! - **Polling**: one status request per call, no internal retry
//! - **Download**: fetches completed artifacts by reference
//!
//! ## WASM Backend
//! Sandboxed ffmpeg compiled to WASI preview 1, run with wasmtime:
//! - **Loading**: module compiled once, imports restricted to WASI preview 1
//! - **Isolation**: each job runs in a fresh store with a private `/work` directory
//! - **Limits**: optional fuel budget per transform
//!
//! ## Stub Backend (Test-Only)
//! Scripted doubles for the remote worker and engine, only available in
//! test builds.

pub mod remote;
#[cfg(test)]
pub mod stub;
pub mod wasm;
