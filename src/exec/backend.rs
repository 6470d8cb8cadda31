// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The admission queue and retry policy talk to a `ProcessRunner` instead of
//! spawning processes themselves. Production code uses [`ShellRunner`];
//! tests can provide an implementation that scripts failures and records
//! invocations without touching the OS.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::errors::ExecError;
use crate::exec::OutputSink;
use crate::types::CommandSpec;

use super::runner::run_process;

/// Boxed future returned by [`ProcessRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = std::result::Result<(), ExecError>> + Send + 'a>>;

/// Trait abstracting how a single attempt of a command is executed.
pub trait ProcessRunner: Send + Sync {
    /// Run `spec` once, forwarding stdout to `sink` while it runs, and
    /// resolve once it exited successfully or with the reason it failed.
    ///
    /// Implementations should resolve to `ExecError::Cancelled` once
    /// `cancel` fires.
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        sink: &'a mut OutputSink,
        cancel: &'a CancellationToken,
    ) -> RunFuture<'a>;
}

/// Runs commands through the platform shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        sink: &'a mut OutputSink,
        cancel: &'a CancellationToken,
    ) -> RunFuture<'a> {
        Box::pin(run_process(spec, sink, cancel))
    }
}
