use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use concurrently::errors::ExecError;
use concurrently::exec::{OutputSink, ProcessRunner, RunFuture};
use concurrently::types::CommandSpec;

/// What a scripted command does on each attempt.
#[derive(Debug, Clone)]
pub enum Script {
    /// Succeed with this stdout.
    Succeed(String),
    /// Print each chunk, pausing `gap` before every chunk after the first,
    /// then succeed.
    Chunks(Vec<String>, Duration),
    /// Fail the first `n` attempts, then succeed with this stdout.
    FailTimes(u32, String),
    /// Fail every attempt.
    AlwaysFail,
}

#[derive(Debug, Default)]
struct State {
    calls: HashMap<String, u32>,
    started: Vec<String>,
    running: usize,
    peak: usize,
}

/// A fake runner that:
/// - follows a per-command `Script` (unscripted commands echo their name)
/// - sleeps `delay` per attempt so attempts overlap in time
/// - records invocation counts, start order and peak concurrency.
#[derive(Clone)]
pub struct ScriptedRunner {
    scripts: Arc<HashMap<String, Script>>,
    delay: Duration,
    state: Arc<Mutex<State>>,
}

impl ScriptedRunner {
    pub fn new(delay: Duration) -> Self {
        Self {
            scripts: Arc::new(HashMap::new()),
            delay,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn with_script(mut self, command: &str, script: Script) -> Self {
        Arc::make_mut(&mut self.scripts).insert(command.to_string(), script);
        self
    }

    /// Number of attempts made for `command`.
    pub fn calls(&self, command: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(command)
            .copied()
            .unwrap_or(0)
    }

    /// Commands in the order their first attempt started.
    pub fn start_order(&self) -> Vec<String> {
        self.state.lock().unwrap().started.clone()
    }

    /// Highest number of attempts that were running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.state.lock().unwrap().peak
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        sink: &'a mut OutputSink,
        cancel: &'a CancellationToken,
    ) -> RunFuture<'a> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(ExecError::Cancelled);
            }

            let attempt = {
                let mut state = self.state.lock().unwrap();
                let calls = state.calls.entry(spec.executable.clone()).or_insert(0);
                *calls += 1;
                let attempt = *calls;
                if attempt == 1 {
                    state.started.push(spec.executable.clone());
                }
                state.running += 1;
                state.peak = state.peak.max(state.running);
                attempt
            };

            let cancelled = tokio::select! {
                _ = tokio::time::sleep(self.delay) => false,
                _ = cancel.cancelled() => true,
            };

            self.state.lock().unwrap().running -= 1;

            if cancelled {
                return Err(ExecError::Cancelled);
            }

            let failure = || ExecError::ExitStatus {
                command: spec.executable.clone(),
                code: 1,
                stderr: format!("attempt {attempt} failed"),
            };

            match self.scripts.get(&spec.executable) {
                None => {
                    sink.chunk(format!("{}\n", spec.executable).as_bytes()).await;
                    Ok(())
                }
                Some(Script::Succeed(out)) => {
                    if !out.is_empty() {
                        sink.chunk(out.as_bytes()).await;
                    }
                    Ok(())
                }
                Some(Script::Chunks(chunks, gap)) => {
                    for (i, chunk) in chunks.iter().enumerate() {
                        if i > 0 {
                            tokio::select! {
                                _ = tokio::time::sleep(*gap) => {}
                                _ = cancel.cancelled() => return Err(ExecError::Cancelled),
                            }
                        }
                        sink.chunk(chunk.as_bytes()).await;
                    }
                    Ok(())
                }
                Some(Script::FailTimes(n, out)) if attempt > *n => {
                    sink.chunk(out.as_bytes()).await;
                    Ok(())
                }
                Some(Script::FailTimes(..)) | Some(Script::AlwaysFail) => Err(failure()),
            }
        })
    }
}
