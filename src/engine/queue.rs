// src/engine/queue.rs

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::ExecError;
use crate::exec::{OutputSink, ProcessRunner, RetryConfig, format_header, run_with_retry};
use crate::types::CommandSpec;

use super::{EventStream, ResultEvent};

/// Concurrency limit actually used for a batch of `count` commands.
///
/// - `None` means no explicit cap: every command may run at once.
/// - `Some(m)` is capped at the batch size and never drops below 1.
pub fn effective_limit(configured: Option<usize>, count: usize) -> usize {
    let count = count.max(1);
    match configured {
        None => count,
        Some(m) => m.clamp(1, count),
    }
}

/// Admission control for one batch of commands.
///
/// Slots are permits of a fair `Semaphore`. A single dispatcher task walks
/// the command list in order and waits for a free slot before releasing the
/// next command, so commands start strictly in submission order. A slot is
/// held for a command's whole attempt sequence, retries included.
#[derive(Debug, Clone)]
pub struct AdmissionQueue {
    limit: usize,
    slots: Arc<Semaphore>,
}

impl AdmissionQueue {
    /// Create a queue with `limit` slots (at least 1).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            slots: Arc::new(Semaphore::new(limit)),
        }
    }

    /// Create a queue sized for a batch; see [`effective_limit`].
    pub fn for_batch(configured: Option<usize>, count: usize) -> Self {
        Self::new(effective_limit(configured, count))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of slots currently occupied.
    pub fn in_flight(&self) -> usize {
        self.limit - self.slots.available_permits()
    }

    /// Schedule `commands` and return one stream per command, in input order.
    ///
    /// Returns immediately. Each stream carries the command's output as it
    /// is produced and then `Complete`, or `Failed("cancelled")` when
    /// `cancel` fires before the command finished. Dropping the streams does
    /// not stop the commands; only `cancel` does. Must be called within a
    /// Tokio runtime.
    pub fn schedule<R>(
        &self,
        commands: Vec<CommandSpec>,
        runner: Arc<R>,
        retry: RetryConfig,
        cancel: CancellationToken,
    ) -> Vec<EventStream>
    where
        R: ProcessRunner + ?Sized + 'static,
    {
        let mut sinks = Vec::with_capacity(commands.len());
        let mut streams = Vec::with_capacity(commands.len());

        for spec in &commands {
            let (sink, rx) = OutputSink::channel(format_header(spec, retry.color));
            sinks.push(sink);
            streams.push(EventStream::from_channel(rx));
        }

        let slots = Arc::clone(&self.slots);
        let limit = self.limit;

        tokio::spawn(async move {
            info!(commands = commands.len(), limit, "admission dispatcher started");

            for (index, (spec, sink)) in commands.into_iter().zip(sinks).enumerate() {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = Arc::clone(&slots).acquire_owned() => permit.ok(),
                };

                let Some(permit) = permit else {
                    debug!(command = %spec.name, index, "batch cancelled before admission");
                    sink.close(ResultEvent::Failed(ExecError::Cancelled.to_string()))
                        .await;
                    continue;
                };

                debug!(command = %spec.name, index, "command admitted");

                let runner = Arc::clone(&runner);
                let retry = retry.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let mut sink = sink;
                    let result =
                        run_with_retry(runner.as_ref(), &spec, &retry, &mut sink, &cancel).await;
                    // Free the slot before reporting, so an observer of the
                    // terminal event already sees the slot as available.
                    drop(permit);
                    debug!(command = %spec.name, index, ok = result.is_ok(), "command finished");
                    let terminal = match result {
                        Ok(()) => ResultEvent::Complete,
                        Err(err) => ResultEvent::Failed(err.to_string()),
                    };
                    sink.close(terminal).await;
                });
            }

            debug!("admission dispatcher finished");
        });

        streams
    }
}
