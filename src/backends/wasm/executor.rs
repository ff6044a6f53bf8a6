// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution of the WASI media engine.
//!
//! The compiled module is shared by every job. Each job gets a
//! [`WasiWorkspace`]: a private temporary directory that is preopened as
//! `/work` inside a fresh store, so a run can only see its own files.
//! Runs execute on the blocking pool because a transform is CPU-bound and
//! may take minutes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use wasmtime::{Engine, Linker, Module, Store, Trap};
use wasmtime_wasi::p1::{self, WasiP1Ctx};
use wasmtime_wasi::{DirPerms, FilePerms, I32Exit, WasiCtxBuilder};

use crate::backends::wasm::capability_manager::ENTRY_POINT;
use crate::errors::{EngineError, EngineResult};
use crate::traits::{EngineWorkspace, MediaEngine};

/// Guest path the job workspace is mounted at.
pub const GUEST_DIR: &str = "/work";

/// `argv[0]` passed to the engine.
const PROGRAM_NAME: &str = "ffmpeg";

/// Compiled engine state shared between workspaces.
struct EngineRuntime {
    engine: Engine,
    module: Module,
    linker: Linker<WasiP1Ctx>,
    fuel: Option<u64>,
}

impl EngineRuntime {
    fn run(&self, host_dir: &Path, args: &[String]) -> EngineResult<()> {
        let mut builder = WasiCtxBuilder::new();
        builder.arg(PROGRAM_NAME).args(args);
        builder
            .preopened_dir(host_dir, GUEST_DIR, DirPerms::all(), FilePerms::all())
            .map_err(|e| EngineError::Execution(format!("cannot mount workspace: {}", e)))?;

        let mut store = Store::new(&self.engine, builder.build_p1());
        if let Some(fuel) = self.fuel {
            store
                .set_fuel(fuel)
                .map_err(|e| EngineError::Execution(e.to_string()))?;
        }

        let instance = self
            .linker
            .instantiate(&mut store, &self.module)
            .map_err(|e| EngineError::Execution(format!("instantiation failed: {}", e)))?;
        let start = instance
            .get_typed_func::<(), ()>(&mut store, ENTRY_POINT)
            .map_err(|e| EngineError::Execution(e.to_string()))?;

        match start.call(&mut store, ()) {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<I32Exit>() {
                Some(I32Exit(0)) => Ok(()),
                Some(I32Exit(code)) => Err(EngineError::ExitStatus(*code)),
                None if matches!(e.downcast_ref::<Trap>(), Some(Trap::OutOfFuel)) => Err(
                    EngineError::Execution("fuel budget exhausted".to_string()),
                ),
                None => Err(EngineError::Execution(format!("{:#}", e))),
            },
        }
    }
}

/// Loaded WASI media engine.
pub struct WasiMediaEngine {
    runtime: Arc<EngineRuntime>,
    name: String,
}

impl WasiMediaEngine {
    pub fn new(engine: Engine, module: Module, fuel: Option<u64>, name: String) -> EngineResult<Self> {
        let mut linker: Linker<WasiP1Ctx> = Linker::new(&engine);
        p1::add_to_linker_sync(&mut linker, |ctx: &mut WasiP1Ctx| ctx)
            .map_err(|e| EngineError::Load(format!("failed to link WASI: {}", e)))?;

        Ok(Self {
            runtime: Arc::new(EngineRuntime {
                engine,
                module,
                linker,
                fuel,
            }),
            name,
        })
    }
}

impl MediaEngine for WasiMediaEngine {
    fn open_workspace(&self) -> EngineResult<Box<dyn EngineWorkspace>> {
        let dir = tempfile::Builder::new().prefix("media-job-").tempdir()?;
        Ok(Box::new(WasiWorkspace {
            runtime: Arc::clone(&self.runtime),
            dir,
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Scratch directory for one job; removed on drop.
pub struct WasiWorkspace {
    runtime: Arc<EngineRuntime>,
    dir: TempDir,
}

impl WasiWorkspace {
    fn host_path(&self, name: &str) -> EngineResult<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(EngineError::InvalidFileName(name.to_string()));
        }
        Ok(self.dir.path().join(name))
    }
}

#[async_trait]
impl EngineWorkspace for WasiWorkspace {
    fn path_of(&self, name: &str) -> String {
        format!("{}/{}", GUEST_DIR, name)
    }

    async fn write_file(&mut self, name: &str, contents: &[u8]) -> EngineResult<()> {
        let path = self.host_path(name)?;
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    async fn execute(&mut self, args: Vec<String>) -> EngineResult<()> {
        let runtime = Arc::clone(&self.runtime);
        let host_dir = self.dir.path().to_path_buf();
        tokio::task::spawn_blocking(move || runtime.run(&host_dir, &args)).await?
    }

    async fn read_file(&mut self, name: &str) -> EngineResult<Vec<u8>> {
        let path = self.host_path(name)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::MissingOutput(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::wasm::capability_manager::create_engine;

    /// Creates `/work/out.bin` containing "ok", then returns normally.
    const WRITES_OUTPUT: &str = r#"(module
        (import "wasi_snapshot_preview1" "path_open"
            (func $path_open (param i32 i32 i32 i32 i32 i64 i64 i32 i32) (result i32)))
        (import "wasi_snapshot_preview1" "fd_write"
            (func $fd_write (param i32 i32 i32 i32) (result i32)))
        (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
        (memory (export "memory") 1)
        (data (i32.const 16) "out.bin")
        (data (i32.const 32) "ok")
        (data (i32.const 48) "\20\00\00\00\02\00\00\00")
        (func (export "_start")
            (if (call $path_open (i32.const 3) (i32.const 0) (i32.const 16) (i32.const 7)
                    (i32.const 9) (i64.const 66) (i64.const 0) (i32.const 0) (i32.const 64))
                (then (call $proc_exit (i32.const 2))))
            (drop (call $fd_write (i32.load (i32.const 64)) (i32.const 48) (i32.const 1) (i32.const 72)))))"#;

    const EXITS_ZERO: &str = r#"(module
        (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
        (memory (export "memory") 1)
        (func (export "_start") (call $proc_exit (i32.const 0))))"#;

    const EXITS_ONE: &str = r#"(module
        (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
        (memory (export "memory") 1)
        (func (export "_start") (call $proc_exit (i32.const 1))))"#;

    const SPINS: &str = r#"(module
        (memory (export "memory") 1)
        (func (export "_start") (loop $forever (br $forever))))"#;

    fn media_engine(wat: &str, fuel: Option<u64>) -> WasiMediaEngine {
        let engine = create_engine(fuel.is_some()).unwrap();
        let module = Module::new(&engine, wat::parse_str(wat).unwrap()).unwrap();
        WasiMediaEngine::new(engine, module, fuel, "test.wasm".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_engine_writes_output_into_workspace() {
        let engine = media_engine(WRITES_OUTPUT, None);
        let mut workspace = engine.open_workspace().unwrap();

        workspace.write_file("input.mp4", b"source").await.unwrap();
        let args = vec!["-i".to_string(), workspace.path_of("input.mp4")];
        workspace.execute(args).await.unwrap();

        assert_eq!(workspace.read_file("out.bin").await.unwrap(), b"ok");
        assert_eq!(workspace.read_file("input.mp4").await.unwrap(), b"source");
    }

    #[tokio::test]
    async fn test_exit_zero_is_success_and_missing_output_reported() {
        let engine = media_engine(EXITS_ZERO, None);
        let mut workspace = engine.open_workspace().unwrap();

        workspace.execute(Vec::new()).await.unwrap();
        let error = workspace.read_file("output.gif").await.unwrap_err();
        assert!(matches!(error, EngineError::MissingOutput(name) if name == "output.gif"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_engine_usable() {
        let engine = media_engine(EXITS_ONE, None);

        for _ in 0..2 {
            let mut workspace = engine.open_workspace().unwrap();
            let error = workspace.execute(Vec::new()).await.unwrap_err();
            assert!(matches!(error, EngineError::ExitStatus(1)));
        }
    }

    #[tokio::test]
    async fn test_fuel_bounds_runaway_modules() {
        let engine = media_engine(SPINS, Some(10_000));
        let mut workspace = engine.open_workspace().unwrap();

        let error = workspace.execute(Vec::new()).await.unwrap_err();
        assert!(matches!(error, EngineError::Execution(message) if message.contains("fuel")));
    }

    #[tokio::test]
    async fn test_workspaces_are_isolated() {
        let engine = media_engine(EXITS_ZERO, None);
        let mut first = engine.open_workspace().unwrap();
        let mut second = engine.open_workspace().unwrap();

        first.write_file("input.mp4", b"first").await.unwrap();
        second.write_file("input.mp4", b"second").await.unwrap();

        assert_eq!(first.read_file("input.mp4").await.unwrap(), b"first");
        assert_eq!(second.read_file("input.mp4").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let engine = media_engine(EXITS_ZERO, None);
        let mut workspace = engine.open_workspace().unwrap();

        for name in ["../escape", "nested/file", "", ".."] {
            let error = workspace.write_file(name, b"x").await.unwrap_err();
            assert!(matches!(error, EngineError::InvalidFileName(_)), "{name:?}");
        }
    }

    #[test]
    fn test_path_of_uses_guest_mount() {
        let engine = media_engine(EXITS_ZERO, None);
        let workspace = engine.open_workspace().unwrap();
        assert_eq!(workspace.path_of("input.mp4"), "/work/input.mp4");
    }
}
