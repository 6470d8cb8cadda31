#![allow(dead_code)]

use std::time::Duration;

use futures::StreamExt;
use concurrently::engine::{BatchOptions, EventStream, ResultEvent};
use concurrently::exec::RetryConfig;
use concurrently::types::CommandSpec;

/// `cmd-0`, `cmd-1`, ... as command specs.
pub fn numbered_commands(count: usize) -> Vec<CommandSpec> {
    (0..count).map(|i| CommandSpec::new(format!("cmd-{i}"))).collect()
}

pub fn commands(names: &[&str]) -> Vec<CommandSpec> {
    names.iter().map(|n| CommandSpec::new(*n)).collect()
}

/// Builder for `BatchOptions` with test-friendly defaults (no color, 1ms backoff).
pub struct BatchOptionsBuilder {
    options: BatchOptions,
}

impl BatchOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: BatchOptions {
                max_processes: None,
                retry: RetryConfig {
                    attempts: 1,
                    backoff: Duration::from_millis(1),
                    color: false,
                },
            },
        }
    }

    pub fn max_processes(mut self, max: usize) -> Self {
        self.options.max_processes = Some(max);
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.options.retry.attempts = attempts;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.options.retry.backoff = backoff;
        self
    }

    pub fn build(self) -> BatchOptions {
        self.options
    }
}

impl Default for BatchOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain a stream into its events.
pub async fn collect_events(stream: EventStream) -> Vec<ResultEvent> {
    stream.collect().await
}

/// `Data` payloads of `events`, sorted, for order-independent comparisons.
pub fn sorted_data(events: &[ResultEvent]) -> Vec<String> {
    let mut data: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            ResultEvent::Data(text) => Some(text.clone()),
            _ => None,
        })
        .collect();
    data.sort();
    data
}
