// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Job orchestration.
//!
//! A [`Dispatcher`] accepts a [`JobRequest`], runs it on its own task and
//! hands back a [`JobHandle`] for observing and cancelling it. Each job
//! walks the [`JobState`] machine: validate, route, try the remote worker
//! when routed there, fall back to the local engine once if the worker is
//! unavailable, and settle in `completed` or `failed`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::backends::remote::HttpRemoteWorker;
use crate::backends::wasm::WasiEngineLoader;
use crate::config::{Config, ProgressConfig};
use crate::engine::fallback::FallbackController;
use crate::engine::local::LocalProcessor;
use crate::engine::progress::{ProgressEstimator, ProgressState};
use crate::engine::remote::{PollingPolicy, RemoteJobRunner};
use crate::engine::router::ExecutionRouter;
use crate::engine::EngineRegistry;
use crate::errors::{ConfigError, DispatchError, DispatchResult};
use crate::job::{ExecutionDecision, JobRequest, JobResult, JobState, JobStatus, ValidatedRequest};
use crate::observability::messages::{dispatch::*, StructuredLog};
use crate::traits::RemoteWorker;

/// Entry point for running media jobs. Cheap to clone; clones share the
/// engine registry and job id sequence.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    router: ExecutionRouter,
    remote: Option<RemoteJobRunner>,
    local: LocalProcessor,
    progress: ProgressConfig,
    next_job_id: AtomicU64,
}

impl Dispatcher {
    pub fn new(
        router: ExecutionRouter,
        remote: Option<RemoteJobRunner>,
        local: LocalProcessor,
        progress: ProgressConfig,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                router,
                remote,
                local,
                progress,
                next_job_id: AtomicU64::new(1),
            }),
        }
    }

    /// Wire the HTTP worker client and the WASI engine loader from `config`.
    ///
    /// Nothing is loaded here; the engine is compiled by the first job that
    /// needs it.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let remote = if config.remote.enabled {
            let worker = HttpRemoteWorker::from_config(&config.remote)?;
            Some(RemoteJobRunner::new(
                Arc::new(worker),
                PollingPolicy::from(&config.remote),
            ))
        } else {
            None
        };

        let loader = WasiEngineLoader::new(&config.local.module, config.local.fuel);
        let local = LocalProcessor::new(Arc::new(EngineRegistry::new(Arc::new(loader))));

        Ok(Self::new(
            ExecutionRouter::from_config(config),
            remote,
            local,
            config.progress.clone(),
        ))
    }

    /// Worker client, for fetching remote results by reference.
    pub fn remote_worker(&self) -> Option<Arc<dyn RemoteWorker>> {
        self.inner.remote.as_ref().map(RemoteJobRunner::worker)
    }

    /// Start `request` on a new task.
    pub fn submit(&self, request: JobRequest) -> JobHandle {
        let id = self.inner.next_job_id.fetch_add(1, Ordering::Relaxed);
        let (status_tx, status_rx) = watch::channel(JobStatus::default());
        let progress = ProgressEstimator::new(self.inner.progress.clone());
        let progress_rx = progress.subscribe();
        let cancel = CancellationToken::new();

        let run = JobRun {
            id,
            inner: Arc::clone(&self.inner),
            status: status_tx,
            progress,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run.run(request));

        JobHandle {
            id,
            status: status_rx,
            progress: progress_rx,
            cancel,
            task,
        }
    }

    /// Run `request` to completion.
    pub async fn dispatch(&self, request: JobRequest) -> DispatchResult<JobResult> {
        self.submit(request).wait().await
    }
}

/// Caller's view of a running job.
pub struct JobHandle {
    id: u64,
    status: watch::Receiver<JobStatus>,
    progress: watch::Receiver<ProgressState>,
    cancel: CancellationToken,
    task: JoinHandle<DispatchResult<JobResult>>,
}

impl JobHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> watch::Receiver<JobStatus> {
        self.status.clone()
    }

    pub fn progress(&self) -> watch::Receiver<ProgressState> {
        self.progress.clone()
    }

    /// Ask the job to stop. It resolves to `Cancelled` unless it already
    /// finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn wait(self) -> DispatchResult<JobResult> {
        self.task
            .await
            .unwrap_or_else(|e| Err(DispatchError::Processing(format!("job task failed: {}", e))))
    }
}

/// Per-job state owned by the job's task.
struct JobRun {
    id: u64,
    inner: Arc<DispatcherInner>,
    status: watch::Sender<JobStatus>,
    progress: ProgressEstimator,
    cancel: CancellationToken,
}

impl JobRun {
    async fn run(mut self, request: JobRequest) -> DispatchResult<JobResult> {
        let started = Instant::now();
        let start_msg = JobStarted {
            job_id: self.id,
            tool: request.tool.as_str(),
            size_bytes: request.size(),
        };
        let span = start_msg.span("dispatch");
        start_msg.log();

        async move {
            let cancel = self.cancel.clone();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(DispatchError::Cancelled),
                result = self.drive(request) => result,
            };
            self.finish(outcome, started).await
        }
        .instrument(span)
        .await
    }

    async fn drive(&mut self, request: JobRequest) -> DispatchResult<JobResult> {
        let request = request.validate()?;

        let decision = self.inner.router.route(&request.request);
        RouteSelected {
            job_id: self.id,
            decision: &decision.to_string(),
            size_bytes: request.request.size(),
            threshold_bytes: self.inner.router.size_threshold(),
        }
        .log();
        self.transition(
            JobState::Routed,
            match decision {
                ExecutionDecision::Remote => "Sending to the processing server...",
                ExecutionDecision::Local => "Preparing local processing...",
            },
        );
        self.progress.start();

        let mut fallback = FallbackController::new(decision);
        if decision == ExecutionDecision::Remote {
            match self.run_remote(&request).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    fallback.intercept(e)?;
                    FallbackTriggered {
                        job_id: self.id,
                        reason: fallback.fallback_reason().unwrap_or_default(),
                    }
                    .log();
                }
            }
        }

        let running = match fallback.fallback_reason() {
            Some(reason) => format!("Server unavailable ({}), processing locally...", reason),
            None => "Processing locally...".to_string(),
        };
        self.transition(JobState::LocalRunning, running);
        let result = self.inner.local.run(&request).await;
        match &result {
            Ok(result) => self.transition(
                JobState::LocalCompleted,
                format!("Local processing finished: {}", result.filename),
            ),
            Err(e) => self.transition(JobState::LocalFailed, e.to_string()),
        }

        fallback.finish_local(result)
    }

    async fn run_remote(&self, request: &ValidatedRequest) -> DispatchResult<JobResult> {
        let Some(runner) = self.inner.remote.as_ref() else {
            let error = DispatchError::RemoteUnavailable("remote worker is not configured".to_string());
            self.transition(JobState::RemoteFailed, error.to_string());
            return Err(error);
        };

        let handle = match runner.submit(request).await {
            Ok(handle) => handle,
            Err(e) => {
                self.transition(JobState::RemoteFailed, e.to_string());
                return Err(e);
            }
        };

        if handle.is_terminal() {
            self.transition(JobState::RemoteSubmitted, "Uploaded to server, result ready");
        } else {
            self.transition(
                JobState::RemoteSubmitted,
                format!("Uploaded to server as job {}", handle.id),
            );
            self.transition(JobState::RemotePolling, "Processing on server...");
        }

        match runner.await_completion(handle).await {
            Ok(result) => {
                self.transition(
                    JobState::RemoteCompleted,
                    format!("Server finished: {}", result.filename),
                );
                Ok(result)
            }
            Err(e) => {
                self.transition(JobState::RemoteFailed, e.to_string());
                Err(e)
            }
        }
    }

    async fn finish(
        &mut self,
        outcome: DispatchResult<JobResult>,
        started: Instant,
    ) -> DispatchResult<JobResult> {
        match &outcome {
            Ok(result) => {
                self.progress.complete().await;
                JobCompleted {
                    job_id: self.id,
                    origin: &result.origin.to_string(),
                    filename: &result.filename,
                    duration: started.elapsed(),
                }
                .log();
                self.transition(JobState::Completed, format!("Done: {}", result.filename));
            }
            Err(DispatchError::Cancelled) => {
                self.progress.stop().await;
                JobCancelled {
                    job_id: self.id,
                    state: self.status.borrow().state.as_str(),
                }
                .log();
                self.transition(JobState::Failed, DispatchError::Cancelled.to_string());
            }
            Err(e) => {
                self.progress.stop().await;
                JobFailed {
                    job_id: self.id,
                    kind: e.kind(),
                    error: e,
                }
                .log();
                self.transition(JobState::Failed, e.to_string());
            }
        }
        outcome
    }

    fn transition(&self, next: JobState, message: impl Into<String>) {
        let current = self.status.borrow().state;
        if !current.can_transition_to(next) {
            InvalidStateTransition {
                job_id: self.id,
                from: current.as_str(),
                to: next.as_str(),
            }
            .log();
            return;
        }

        StateTransition {
            job_id: self.id,
            from: current.as_str(),
            to: next.as_str(),
        }
        .log();
        self.status
            .send_replace(JobStatus::with_message(next, message));
    }
}
