// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::job::{ExecutionDecision, JobRequest};

/// Chooses the execution path for a job from its source size.
///
/// Sources strictly larger than the threshold always run locally and are
/// never submitted to the worker. Everything else is a remote attempt,
/// unless the worker is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRouter {
    size_threshold: u64,
    remote_enabled: bool,
}

impl ExecutionRouter {
    pub fn new(size_threshold: u64, remote_enabled: bool) -> Self {
        Self {
            size_threshold,
            remote_enabled,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.routing.size_threshold_bytes, config.remote.enabled)
    }

    pub fn route(&self, request: &JobRequest) -> ExecutionDecision {
        if !self.remote_enabled || request.size() > self.size_threshold {
            ExecutionDecision::Local
        } else {
            ExecutionDecision::Remote
        }
    }

    pub fn size_threshold(&self) -> u64 {
        self.size_threshold
    }
}
