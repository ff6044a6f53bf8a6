// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // remote worker client + WASI engine
pub mod config;     // YAML/TOML settings
pub mod engine;     // routing, fallback, dispatch
pub mod errors;     // error handling
pub mod job;        // requests, results, job states
pub mod observability;
pub mod traits;     // seams between dispatch and backends
