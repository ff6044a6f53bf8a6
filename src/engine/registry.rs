// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::errors::{DispatchError, DispatchResult};
use crate::observability::messages::{engine::*, StructuredLog};
use crate::traits::{EngineHandle, EngineLoader};

/// Holds the process-wide loaded engine.
///
/// The first caller triggers the load; callers arriving while it is in
/// flight wait for the same load instead of starting their own. A failed
/// load leaves the registry empty so a later job can retry.
pub struct EngineRegistry {
    loader: Arc<dyn EngineLoader>,
    engine: OnceCell<EngineHandle>,
}

impl EngineRegistry {
    pub fn new(loader: Arc<dyn EngineLoader>) -> Self {
        Self {
            loader,
            engine: OnceCell::new(),
        }
    }

    pub async fn ensure_loaded(&self) -> DispatchResult<EngineHandle> {
        if let Some(engine) = self.engine.get() {
            EngineReused {
                engine: self.loader.name(),
            }
            .log();
            return Ok(Arc::clone(engine));
        }

        let engine = self
            .engine
            .get_or_try_init(|| async {
                EngineLoadStarted {
                    engine: self.loader.name(),
                }
                .log();

                self.loader.load().await.map_err(|e| {
                    EngineLoadFailed {
                        engine: self.loader.name(),
                        error: &e,
                    }
                    .log();
                    DispatchError::LocalEngineUnavailable(e.to_string())
                })
            })
            .await?;

        Ok(Arc::clone(engine))
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.initialized()
    }
}
