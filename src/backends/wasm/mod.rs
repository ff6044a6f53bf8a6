// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod capability_manager;
pub mod executor;
pub mod loader;

pub use executor::{WasiMediaEngine, WasiWorkspace, GUEST_DIR};
pub use loader::WasiEngineLoader;
