// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::DispatchResult;
use crate::job::{RemoteJobHandle, ValidatedRequest};

/// Client side of the remote processing worker.
///
/// Each call is a single request with no internal retry; the polling loop
/// and its limits live in the caller. Transport failures, rejected
/// submissions and undecodable responses surface as
/// `DispatchError::RemoteUnavailable`.
#[async_trait]
pub trait RemoteWorker: Send + Sync {
    /// Upload the source and tool parameters; returns a `processing` handle.
    async fn submit(&self, request: &ValidatedRequest) -> DispatchResult<RemoteJobHandle>;

    /// Query the worker once for the current status of `handle`.
    async fn poll(&self, handle: &RemoteJobHandle) -> DispatchResult<RemoteJobHandle>;

    /// Download a completed artifact by its result reference.
    async fn fetch_result(&self, result_ref: &str) -> DispatchResult<Bytes>;

    fn name(&self) -> &'static str;
}
