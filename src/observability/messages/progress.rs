// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Estimator timer started.
pub struct ProgressStarted {
    pub tick_interval: Duration,
    pub ceiling: u8,
}

impl Display for ProgressStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Progress estimation started: tick every {:?}, capped at {}%",
            self.tick_interval, self.ceiling
        )
    }
}

impl StructuredLog for ProgressStarted {
    fn log(&self) {
        tracing::debug!(
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            ceiling = self.ceiling,
            "{}", self
        );
    }
}

/// Estimated percentage advanced.
pub struct ProgressTick<'a> {
    pub percent: u8,
    pub message: &'a str,
}

impl Display for ProgressTick<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}% {}", self.percent, self.message)
    }
}

impl StructuredLog for ProgressTick<'_> {
    fn log(&self) {
        tracing::trace!(percent = self.percent, message = self.message, "{}", self);
    }
}

/// Estimator stopped, either at completion or on failure.
pub struct ProgressFinished {
    pub percent: u8,
    pub completed: bool,
}

impl Display for ProgressFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.completed {
            write!(f, "Progress completed at {}%", self.percent)
        } else {
            write!(f, "Progress stopped at {}%", self.percent)
        }
    }
}

impl StructuredLog for ProgressFinished {
    fn log(&self) {
        tracing::debug!(percent = self.percent, completed = self.completed, "{}", self);
    }
}
