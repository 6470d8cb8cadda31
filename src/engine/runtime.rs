// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::exec::{ProcessRunner, RetryConfig};
use crate::types::CommandSpec;

use super::{AdmissionQueue, EventStream};

/// Options for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Concurrency cap; `None` lets every command run at once.
    pub max_processes: Option<usize>,
    pub retry: RetryConfig,
}

/// Runs batches of commands through a `ProcessRunner`.
///
/// Owns the runner, the batch options and the cancellation token; the
/// caller only deals with the aggregate stream returned by [`Runtime::start`].
pub struct Runtime<R: ProcessRunner> {
    runner: Arc<R>,
    options: BatchOptions,
    cancel: CancellationToken,
}

impl<R: ProcessRunner> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R: ProcessRunner + 'static> Runtime<R> {
    pub fn new(runner: Arc<R>, options: BatchOptions, cancel: CancellationToken) -> Self {
        Self {
            runner,
            options,
            cancel,
        }
    }

    /// Schedule `commands` and return their merged output stream.
    ///
    /// - Commands start FIFO under the effective concurrency limit, and
    ///   their output is relayed chunk by chunk while they run.
    /// - Every command goes through the retry policy, so the stream only
    ///   fails on cancellation.
    /// - An empty batch completes immediately.
    /// - Dropping the returned stream leaves started commands running; cancel
    ///   the runtime's token to stop them.
    pub fn start(&self, commands: Vec<CommandSpec>) -> EventStream {
        let queue = AdmissionQueue::for_batch(self.options.max_processes, commands.len());

        info!(
            commands = commands.len(),
            limit = queue.limit(),
            attempts = self.options.retry.attempts,
            "starting batch"
        );

        let streams = queue.schedule(
            commands,
            Arc::clone(&self.runner),
            self.options.retry.clone(),
            self.cancel.clone(),
        );

        EventStream::merge_all(streams)
    }
}
