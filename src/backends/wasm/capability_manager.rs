// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wasmtime engine configuration and import policy for the media engine.
//!
//! The engine module is a WASI preview 1 command. Its only capabilities are
//! the WASI preview 1 host functions, and the only filesystem it can reach is
//! the per-job directory preopened at execution time.

use crate::errors::{EngineError, EngineResult};
use wasmtime::{Config, Engine, ExternType, Module};

/// Import module name of WASI preview 1 host functions.
pub const WASI_PREVIEW1: &str = "wasi_snapshot_preview1";

/// Command entry point every engine module must export.
pub const ENTRY_POINT: &str = "_start";

/// Creates a Wasmtime engine for running the media engine module.
///
/// * `consume_fuel` is enabled only when a fuel budget is configured
/// * Threads are disabled; SIMD stays on since codec builds rely on it
/// * Epoch interruption is off so long transforms are never interrupted
pub fn create_engine(fuel_enabled: bool) -> EngineResult<Engine> {
    let mut config = Config::new();

    config.wasm_threads(false);
    config.consume_fuel(fuel_enabled);
    config.epoch_interruption(false);

    Engine::new(&config).map_err(|e| EngineError::Load(e.to_string()))
}

/// Reject modules that are not a plain WASI preview 1 command.
pub fn validate_module(module: &Module) -> EngineResult<()> {
    if let Some(import) = module
        .imports()
        .find(|import| import.module() != WASI_PREVIEW1)
    {
        return Err(EngineError::Load(format!(
            "import '{}::{}' is not allowed; only {} imports are available",
            import.module(),
            import.name(),
            WASI_PREVIEW1
        )));
    }

    match module.get_export(ENTRY_POINT) {
        Some(ExternType::Func(_)) => Ok(()),
        _ => Err(EngineError::Load(format!(
            "module does not export a '{}' function",
            ENTRY_POINT
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(engine: &Engine, wat: &str) -> Module {
        Module::new(engine, wat::parse_str(wat).unwrap()).unwrap()
    }

    #[test]
    fn test_create_engine_with_and_without_fuel() {
        assert!(create_engine(true).is_ok());
        assert!(create_engine(false).is_ok());
    }

    #[test]
    fn test_accepts_wasi_command() {
        let engine = create_engine(false).unwrap();
        let module = compile(
            &engine,
            r#"(module
                (import "wasi_snapshot_preview1" "proc_exit" (func (param i32)))
                (memory (export "memory") 1)
                (func (export "_start")))"#,
        );
        assert!(validate_module(&module).is_ok());
    }

    #[test]
    fn test_rejects_foreign_imports() {
        let engine = create_engine(false).unwrap();
        let module = compile(
            &engine,
            r#"(module
                (import "env" "host_call" (func))
                (func (export "_start")))"#,
        );
        let error = validate_module(&module).unwrap_err();
        assert!(error.to_string().contains("env::host_call"));
    }

    #[test]
    fn test_rejects_missing_entry_point() {
        let engine = create_engine(false).unwrap();
        let module = compile(&engine, r#"(module (func (export "main")))"#);
        let error = validate_module(&module).unwrap_err();
        assert!(error.to_string().contains("_start"));
    }
}
