// src/exec/retry.rs

//! Retry wrapper around a [`ProcessRunner`].
//!
//! Every command ends with its output on the sink: either what it printed,
//! or (after the last failed attempt) its error message. Only cancellation
//! escapes as an error, so one failing command never takes its siblings
//! down with it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::{OutputSink, ProcessRunner};
use crate::present::style::{Style, paint};
use crate::types::CommandSpec;

/// Default pause between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total tries per command, including the first. Clamped to at least 1.
    pub attempts: u32,
    /// Constant delay between two attempts.
    pub backoff: Duration,
    /// Colorize the header and converted errors.
    pub color: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 1,
            backoff: DEFAULT_BACKOFF,
            color: false,
        }
    }
}

/// Run `spec` through `runner`, retrying failures with a constant backoff.
///
/// Every attempt streams its stdout to `sink` live. An attempt that printed
/// something and then failed is followed by a `retry n/m` marker line before
/// the next attempt starts. A command that fails on every attempt still
/// resolves `Ok`, with its last error message as the final line of output.
/// `Err` is only returned for `ExecError::Cancelled`.
pub async fn run_with_retry<R>(
    runner: &R,
    spec: &CommandSpec,
    config: &RetryConfig,
    sink: &mut OutputSink,
    cancel: &CancellationToken,
) -> Result<(), ExecError>
where
    R: ProcessRunner + ?Sized,
{
    let attempts = config.attempts.max(1);
    let mut attempt = 1;

    loop {
        sink.begin_attempt();
        let result = runner.run(spec, sink, cancel).await;
        sink.end_attempt().await;

        match result {
            Ok(()) => {
                debug!(command = %spec.name, attempt, "attempt succeeded");
                break;
            }
            Err(err) if err.is_cancelled() => return Err(err),
            Err(err) if attempt >= attempts => {
                warn!(
                    command = %spec.name,
                    attempts,
                    error = %err,
                    "all attempts failed"
                );
                sink.line(&paint(&err.to_string(), Style::Red, config.color))
                    .await;
                break;
            }
            Err(err) => {
                info!(
                    command = %spec.name,
                    attempt,
                    error = %err,
                    backoff_ms = config.backoff.as_millis() as u64,
                    "attempt failed; retrying after backoff"
                );
                let printed = sink.attempt_had_output();
                tokio::select! {
                    _ = tokio::time::sleep(config.backoff) => {}
                    _ = cancel.cancelled() => return Err(ExecError::Cancelled),
                }
                attempt += 1;
                if printed {
                    let marker = format!("--- retry {attempt}/{attempts} ---");
                    sink.line(&paint(&marker, Style::Red, config.color)).await;
                }
            }
        }
    }

    sink.finish().await;
    Ok(())
}

/// The `$ <name>` line in front of a command's output.
pub fn format_header(spec: &CommandSpec, color: bool) -> String {
    paint(&format!("$ {}", spec.name), Style::Cyan, color)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::sync::mpsc;

    use super::*;
    use crate::engine::ResultEvent;
    use crate::exec::RunFuture;

    /// Fails the first `failures` calls, then prints "ok".
    ///
    /// With `partial` set, failing attempts print "partial" first.
    struct Flaky {
        failures: u32,
        partial: bool,
        calls: AtomicU32,
        seen: Mutex<Vec<u32>>,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                partial: false,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn printing_before_failure(failures: u32) -> Self {
            Self {
                partial: true,
                ..Self::new(failures)
            }
        }
    }

    impl ProcessRunner for Flaky {
        fn run<'a>(
            &'a self,
            spec: &'a CommandSpec,
            sink: &'a mut OutputSink,
            _: &'a CancellationToken,
        ) -> RunFuture<'a> {
            Box::pin(async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                self.seen.lock().unwrap().push(n);
                if n <= self.failures {
                    if self.partial {
                        sink.chunk(b"partial").await;
                    }
                    Err(ExecError::ExitStatus {
                        command: spec.executable.clone(),
                        code: 1,
                        stderr: format!("failure {n}"),
                    })
                } else {
                    sink.chunk(b"ok\n").await;
                    Ok(())
                }
            })
        }
    }

    fn config(attempts: u32) -> RetryConfig {
        RetryConfig {
            attempts,
            backoff: Duration::from_millis(1),
            color: false,
        }
    }

    fn data(rx: &mut mpsc::Receiver<ResultEvent>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ResultEvent::Data(text) = event {
                out.push(text);
            }
        }
        out
    }

    async fn run(runner: &Flaky, name: &str, config: &RetryConfig) -> Vec<String> {
        let spec = CommandSpec::new(name);
        let (mut sink, mut rx) = OutputSink::channel(format_header(&spec, false));
        run_with_retry(runner, &spec, config, &mut sink, &CancellationToken::new())
            .await
            .unwrap();
        drop(sink);
        data(&mut rx)
    }

    #[tokio::test]
    async fn success_on_first_attempt_is_prefixed() {
        let runner = Flaky::new(0);
        assert_eq!(run(&runner, "ls", &config(3)).await, vec!["$ ls\nok\n"]);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn silent_failures_before_success_leave_no_trace() {
        let runner = Flaky::new(2);
        assert_eq!(run(&runner, "flaky", &config(3)).await, vec!["$ flaky\nok\n"]);
        assert_eq!(*runner.seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn retry_after_partial_output_is_marked() {
        let runner = Flaky::printing_before_failure(1);
        assert_eq!(
            run(&runner, "flaky", &config(3)).await,
            vec!["$ flaky\npartial", "\n--- retry 2/3 ---\n", "ok\n"]
        );
    }

    #[tokio::test]
    async fn exhausted_retries_become_output() {
        let runner = Flaky::new(u32::MAX);
        assert_eq!(
            run(&runner, "false", &config(3)).await,
            vec!["$ false\n`false` exited with status 1: failure 3\n"]
        );
        assert_eq!(runner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn single_attempt_means_no_retry() {
        let runner = Flaky::new(1);
        let out = run(&runner, "once", &config(1)).await;
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("exited with status 1"));
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_during_backoff_is_not_converted() {
        let runner = Flaky::new(u32::MAX);
        let cancel = CancellationToken::new();
        let slow = RetryConfig {
            attempts: 5,
            backoff: Duration::from_secs(30),
            color: false,
        };
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let spec = CommandSpec::new("x");
        let (mut sink, mut rx) = OutputSink::channel(format_header(&spec, false));
        let err = run_with_retry(&runner, &spec, &slow, &mut sink, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
        drop(sink);
        assert!(data(&mut rx).is_empty());
    }

    #[test]
    fn header_is_colored_when_enabled() {
        let spec = CommandSpec::named("build", "make");
        assert_eq!(format_header(&spec, false), "$ build");

        colored::control::set_override(true);
        let colored = format_header(&spec, true);
        assert!(colored.starts_with("\u{1b}["));
        assert!(colored.contains("$ build"));
    }
}
