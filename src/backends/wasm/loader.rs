// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Loading of the WASI media engine module.
//!
//! Reads the module from disk, enforces a size limit, compiles it on the
//! blocking pool and checks its imports and entry point before handing out
//! a shareable [`WasiMediaEngine`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use wasmtime::Module;

use crate::backends::wasm::capability_manager::{create_engine, validate_module};
use crate::backends::wasm::executor::WasiMediaEngine;
use crate::errors::{EngineError, EngineResult};
use crate::observability::messages::{engine::EngineLoaded, StructuredLog};
use crate::traits::{EngineHandle, EngineLoader};

/// Maximum accepted engine module size (256MB)
const MAX_ENGINE_MODULE_SIZE: usize = 256 * 1024 * 1024;

pub struct WasiEngineLoader {
    module_path: PathBuf,
    module_name: String,
    fuel: Option<u64>,
}

impl WasiEngineLoader {
    pub fn new(module_path: impl AsRef<Path>, fuel: Option<u64>) -> Self {
        let module_path = module_path.as_ref().to_path_buf();
        Self {
            module_name: module_path.display().to_string(),
            module_path,
            fuel,
        }
    }
}

#[async_trait]
impl EngineLoader for WasiEngineLoader {
    async fn load(&self) -> EngineResult<EngineHandle> {
        let started = Instant::now();

        let bytes = tokio::fs::read(&self.module_path).await.map_err(|e| {
            EngineError::Load(format!("cannot read '{}': {}", self.module_name, e))
        })?;
        if bytes.len() > MAX_ENGINE_MODULE_SIZE {
            return Err(EngineError::Load(format!(
                "module too large: {} bytes (max: {} bytes)",
                bytes.len(),
                MAX_ENGINE_MODULE_SIZE
            )));
        }
        let size_bytes = bytes.len();

        let engine = create_engine(self.fuel.is_some())?;
        let compile_engine = engine.clone();
        let module = tokio::task::spawn_blocking(move || Module::new(&compile_engine, &bytes))
            .await?
            .map_err(|e| EngineError::Load(format!("compilation failed: {}", e)))?;
        validate_module(&module)?;

        let media_engine = WasiMediaEngine::new(engine, module, self.fuel, self.module_name.clone())?;

        EngineLoaded {
            engine: &self.module_name,
            size_bytes,
            duration: started.elapsed(),
        }
        .log();

        Ok(Arc::new(media_engine))
    }

    fn name(&self) -> &str {
        &self.module_name
    }
}
