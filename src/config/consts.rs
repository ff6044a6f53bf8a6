// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Jobs larger than this (50 MiB) never try the remote worker
pub const DEFAULT_SIZE_THRESHOLD_BYTES: u64 = 52_428_800;

/// Base URL of the remote processing worker
pub const DEFAULT_REMOTE_BASE_URL: &str = "http://127.0.0.1:5000";
/// Delay between status polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
/// Polls allowed before a remote job is abandoned (5 minutes at the default cadence)
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 150;
/// Transport failures in a row tolerated while polling
pub const DEFAULT_MAX_CONSECUTIVE_POLL_ERRORS: u32 = 3;
/// Per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Path of the WASI ffmpeg module
pub const DEFAULT_ENGINE_MODULE: &str = "engines/ffmpeg.wasm";

/// Progress estimator tick interval
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_500;
pub const DEFAULT_MIN_INCREMENT: u8 = 3;
pub const DEFAULT_MAX_INCREMENT: u8 = 10;
/// Highest percentage the estimator reports before the job completes
pub const DEFAULT_PROGRESS_CEILING: u8 = 90;
