// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging goes through message structs in
//! [`messages`]. Each one renders a stable human-readable line through
//! `Display` and emits typed `tracing` fields through
//! [`messages::StructuredLog`], so log text never appears as ad hoc strings
//! at call sites.
//!
//! # Usage
//!
//! ```rust
//! use media_dispatch::observability::messages::{engine::TransformFailed, StructuredLog};
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "exit status 1");
//! TransformFailed {
//!     tool: "gif",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;
