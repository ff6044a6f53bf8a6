// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod engine;
pub mod remote;

pub use engine::{EngineHandle, EngineLoader, EngineWorkspace, MediaEngine};
pub use remote::RemoteWorker;
