// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] spawns one shell command with `tokio::process::Command` and
//!   forwards its stdout as it arrives.
//! - [`output`] turns raw stdout chunks into a command's `Data` events.
//! - [`backend`] provides the `ProcessRunner` trait the engine talks to, and
//!   the production `ShellRunner`. Tests swap in a scripted fake.
//! - [`retry`] wraps a runner invocation with a constant-backoff retry loop
//!   and turns exhausted retries into printable output.

pub mod backend;
pub mod output;
pub mod retry;
pub mod runner;

pub use backend::{ProcessRunner, RunFuture, ShellRunner};
pub use output::OutputSink;
pub use retry::{RetryConfig, format_header, run_with_retry};
pub use runner::run_process;
