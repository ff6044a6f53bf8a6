// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it as a `tracing` event with typed fields at the
//! level appropriate for the event.
//!
//! # Organization
//!
//! * `dispatch` - job lifecycle, routing and fallback decisions
//! * `remote` - submission and polling against the remote worker
//! * `engine` - sandboxed engine loading and local transforms
//! * `progress` - progress estimator lifecycle
//!
//! # Usage Pattern
//!
//! ```rust
//! use media_dispatch::observability::messages::{dispatch::RouteSelected, StructuredLog};
//!
//! let msg = RouteSelected {
//!     job_id: 7,
//!     decision: "remote",
//!     size_bytes: 10 * 1024 * 1024,
//!     threshold_bytes: 50 * 1024 * 1024,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod dispatch;
pub mod engine;
pub mod progress;
pub mod remote;

/// A message that knows how to emit itself as a structured `tracing` event.
pub trait StructuredLog {
    /// Emit the event at the level appropriate for the message.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("event", span_name = name)
    }
}
