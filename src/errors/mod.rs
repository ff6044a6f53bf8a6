// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod dispatch;
mod engine;
mod validation;

pub use config::{ConfigError, ConfigIssue};
pub use dispatch::{DispatchError, DispatchResult};
pub use engine::{EngineError, EngineResult};
pub use validation::ValidationError;
