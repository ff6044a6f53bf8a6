// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scripted test doubles for the remote worker and the engine boundary.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::{DispatchError, DispatchResult, EngineError, EngineResult};
use crate::job::{RemoteJobHandle, ValidatedRequest};
use crate::traits::{EngineHandle, EngineLoader, EngineWorkspace, MediaEngine, RemoteWorker};

/// Bytes every stub transform writes to its output file.
pub const STUB_OUTPUT: &[u8] = b"stub-output";

/// One scripted answer to a status poll.
#[derive(Debug, Clone)]
pub enum PollReply {
    Processing,
    Completed(&'static str),
    Error(&'static str),
    TransportError(&'static str),
}

/// Remote worker that answers from a script.
///
/// Once the script runs out every poll reports `processing`.
pub struct StubRemoteWorker {
    submission: Result<String, String>,
    replies: Mutex<VecDeque<PollReply>>,
    submits: AtomicUsize,
    polls: AtomicUsize,
    submitted_fields: Mutex<Vec<Vec<(&'static str, String)>>>,
}

impl StubRemoteWorker {
    pub fn accepting(id: &str, replies: Vec<PollReply>) -> Self {
        Self::scripted(Ok(id.to_string()), replies)
    }

    pub fn rejecting(reason: &str) -> Self {
        Self::scripted(Err(reason.to_string()), Vec::new())
    }

    fn scripted(submission: Result<String, String>, replies: Vec<PollReply>) -> Self {
        Self {
            submission,
            replies: Mutex::new(replies.into()),
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            submitted_fields: Mutex::new(Vec::new()),
        }
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    /// Form fields of every submission, in order.
    pub fn submitted_fields(&self) -> Vec<Vec<(&'static str, String)>> {
        self.submitted_fields.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteWorker for StubRemoteWorker {
    async fn submit(&self, request: &ValidatedRequest) -> DispatchResult<RemoteJobHandle> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.submitted_fields
            .lock()
            .unwrap()
            .push(request.params.form_fields());

        match &self.submission {
            Ok(id) => Ok(RemoteJobHandle::accepted(id.clone())),
            Err(reason) => Err(DispatchError::RemoteUnavailable(reason.clone())),
        }
    }

    async fn poll(&self, handle: &RemoteJobHandle) -> DispatchResult<RemoteJobHandle> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PollReply::Processing);

        match reply {
            PollReply::Processing => Ok(handle.clone()),
            PollReply::Completed(file) => Ok(handle.completed(file)),
            PollReply::Error(message) => Ok(handle.failed(message)),
            PollReply::TransportError(message) => {
                Err(DispatchError::RemoteUnavailable(message.to_string()))
            }
        }
    }

    async fn fetch_result(&self, result_ref: &str) -> DispatchResult<Bytes> {
        Ok(Bytes::from(format!("remote:{}", result_ref)))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Engine loader that counts loads and records every executed command.
///
/// Its workspaces keep files in memory; a successful run writes
/// [`STUB_OUTPUT`] to the file named by the last argument.
pub struct CountingEngineLoader {
    loads: AtomicUsize,
    failing_loads: AtomicUsize,
    load_delay: Duration,
    fail_transforms: bool,
    executed: Arc<Mutex<Vec<Vec<String>>>>,
}

impl CountingEngineLoader {
    pub fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            failing_loads: AtomicUsize::new(0),
            load_delay: Duration::ZERO,
            fail_transforms: false,
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every load attempt fails.
    pub fn failing() -> Self {
        Self::new().failing_first(usize::MAX)
    }

    /// The first `count` load attempts fail, later ones succeed.
    pub fn failing_first(self, count: usize) -> Self {
        self.failing_loads.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Every execution exits with status 1.
    pub fn failing_transforms(mut self) -> Self {
        self.fail_transforms = true;
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Argument lists of every execution, in order.
    pub fn executed(&self) -> Vec<Vec<String>> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl EngineLoader for CountingEngineLoader {
    async fn load(&self) -> EngineResult<EngineHandle> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        let should_fail = self
            .failing_loads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if should_fail {
            return Err(EngineError::Load("stub engine missing".to_string()));
        }

        Ok(Arc::new(StubMediaEngine {
            fail_transforms: self.fail_transforms,
            executed: Arc::clone(&self.executed),
        }))
    }

    fn name(&self) -> &str {
        "stub-engine"
    }
}

struct StubMediaEngine {
    fail_transforms: bool,
    executed: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MediaEngine for StubMediaEngine {
    fn open_workspace(&self) -> EngineResult<Box<dyn EngineWorkspace>> {
        Ok(Box::new(StubWorkspace {
            files: HashMap::new(),
            fail: self.fail_transforms,
            executed: Arc::clone(&self.executed),
        }))
    }

    fn name(&self) -> &str {
        "stub-engine"
    }
}

struct StubWorkspace {
    files: HashMap<String, Vec<u8>>,
    fail: bool,
    executed: Arc<Mutex<Vec<Vec<String>>>>,
}

#[async_trait]
impl EngineWorkspace for StubWorkspace {
    fn path_of(&self, name: &str) -> String {
        format!("/work/{}", name)
    }

    async fn write_file(&mut self, name: &str, contents: &[u8]) -> EngineResult<()> {
        self.files.insert(name.to_string(), contents.to_vec());
        Ok(())
    }

    async fn execute(&mut self, args: Vec<String>) -> EngineResult<()> {
        self.executed.lock().unwrap().push(args.clone());
        if self.fail {
            return Err(EngineError::ExitStatus(1));
        }
        if let Some(output) = args.last().and_then(|arg| arg.strip_prefix("/work/")) {
            self.files.insert(output.to_string(), STUB_OUTPUT.to_vec());
        }
        Ok(())
    }

    async fn read_file(&mut self, name: &str) -> EngineResult<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::MissingOutput(name.to_string()))
    }
}
