// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Simulated progress for jobs whose real progress is not observable.
//!
//! Neither the remote worker nor the engine reports progress, so the
//! estimator advances a percentage by a random step on every tick and
//! rotates through a fixed list of phase descriptions. It never reaches
//! 100 on its own; only [`ProgressEstimator::complete`] does.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::ProgressConfig;
use crate::observability::messages::{progress::*, StructuredLog};

/// Floor for the tick period; `tokio::time::interval` rejects zero.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

pub const PHASE_MESSAGES: [&str; 6] = [
    "Uploading video...",
    "Analyzing video...",
    "Processing video...",
    "Encoding...",
    "Almost done...",
    "Finalizing...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub percent: u8,
    pub message_index: usize,
}

impl ProgressState {
    pub fn message(&self) -> &'static str {
        PHASE_MESSAGES[self.message_index % PHASE_MESSAGES.len()]
    }

    /// Next state after one tick. Never decreases and never passes `ceiling`.
    pub fn advance(self, increment: u8, ceiling: u8) -> Self {
        let percent = if self.percent >= ceiling {
            self.percent
        } else {
            self.percent.saturating_add(increment).min(ceiling)
        };
        Self {
            percent,
            message_index: (self.message_index + 1) % PHASE_MESSAGES.len(),
        }
    }
}

pub struct ProgressEstimator {
    config: ProgressConfig,
    state: Arc<watch::Sender<ProgressState>>,
    ticker: Option<(CancellationToken, JoinHandle<()>)>,
}

impl ProgressEstimator {
    pub fn new(config: ProgressConfig) -> Self {
        let (state, _) = watch::channel(ProgressState::default());
        Self {
            config,
            state: Arc::new(state),
            ticker: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ProgressState {
        *self.state.borrow()
    }

    /// Reset to 0% and start ticking.
    pub fn start(&mut self) {
        self.cancel_ticker();
        self.state.send_replace(ProgressState::default());

        let token = CancellationToken::new();
        let task = tokio::spawn(tick_loop(
            self.config.clone(),
            Arc::clone(&self.state),
            token.clone(),
        ));
        self.ticker = Some((token, task));

        ProgressStarted {
            tick_interval: self.config.tick_interval(),
            ceiling: self.config.ceiling,
        }
        .log();
    }

    /// Stop ticking and report exactly 100%.
    pub async fn complete(&mut self) {
        self.halt().await;
        self.state.send_modify(|state| state.percent = 100);
        ProgressFinished {
            percent: 100,
            completed: true,
        }
        .log();
    }

    /// Stop ticking and leave the percentage where it is.
    pub async fn stop(&mut self) {
        self.halt().await;
        ProgressFinished {
            percent: self.current().percent,
            completed: false,
        }
        .log();
    }

    /// Cancel the ticker and wait until it can no longer publish.
    async fn halt(&mut self) {
        if let Some((token, task)) = self.ticker.take() {
            token.cancel();
            let _ = task.await;
        }
    }

    fn cancel_ticker(&mut self) {
        if let Some((token, task)) = self.ticker.take() {
            token.cancel();
            task.abort();
        }
    }
}

impl Drop for ProgressEstimator {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

async fn tick_loop(
    config: ProgressConfig,
    state: Arc<watch::Sender<ProgressState>>,
    token: CancellationToken,
) {
    let low = config.min_increment.min(config.max_increment);
    let high = config.min_increment.max(config.max_increment);

    let period = config.tick_interval().max(MIN_TICK_INTERVAL);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let increment = rand::rng().random_range(low..=high);
                state.send_modify(|current| *current = current.advance(increment, config.ceiling));

                let current = *state.borrow();
                ProgressTick {
                    percent: current.percent,
                    message: current.message(),
                }
                .log();
            }
        }
    }
}
