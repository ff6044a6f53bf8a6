// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dispatcher;
pub mod fallback;
pub mod local;
pub mod progress;
pub mod registry;
pub mod remote;
pub mod router;

pub use dispatcher::{Dispatcher, JobHandle};
pub use fallback::FallbackController;
pub use local::{CommandPlan, LocalProcessor};
pub use progress::{ProgressEstimator, ProgressState, PHASE_MESSAGES};
pub use registry::EngineRegistry;
pub use remote::{PollingPolicy, RemoteJobRunner};
pub use router::ExecutionRouter;
