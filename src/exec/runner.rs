// src/exec/runner.rs

//! Single process runner.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::errors::ExecError;
use crate::exec::OutputSink;
use crate::types::CommandSpec;

const CHUNK_SIZE: usize = 8 * 1024;

/// Run one command to completion, forwarding its stdout as it arrives.
///
/// - stdout is read in raw chunks and each chunk goes to `sink` as soon as
///   the pipe delivers it.
/// - stderr is drained in the background and only surfaces in the error
///   message of a non-zero exit.
/// - If `cancel` fires while the process runs, the child is killed and the
///   call resolves to `ExecError::Cancelled`.
pub async fn run_process(
    spec: &CommandSpec,
    sink: &mut OutputSink,
    cancel: &CancellationToken,
) -> Result<(), ExecError> {
    if cancel.is_cancelled() {
        return Err(ExecError::Cancelled);
    }

    info!(command = %spec.name, cmd = %spec.executable, "starting process");

    let mut cmd = shell_command(&spec.executable);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        command: spec.executable.clone(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take().map(|stderr| {
        let name = spec.name.clone();
        tokio::spawn(async move { drain_stderr(stderr, &name).await })
    });

    let result = tokio::select! {
        res = forward_output(&mut child, stdout, spec, sink) => res,
        _ = cancel.cancelled() => {
            info!(command = %spec.name, "cancellation requested; killing process");
            if let Err(e) = child.kill().await {
                warn!(command = %spec.name, error = %e, "failed to kill child process on cancellation");
            }
            return Err(ExecError::Cancelled);
        }
    };

    let (chunks, code) = result?;
    if code == 0 {
        debug!(command = %spec.name, chunks, "process exited successfully");
        return Ok(());
    }

    let stderr_text = match stderr {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };

    info!(command = %spec.name, exit_code = code, "process exited with failure");
    Err(ExecError::ExitStatus {
        command: spec.executable.clone(),
        code,
        stderr: stderr_text,
    })
}

/// Build a shell command appropriate for the platform.
fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}

/// Forward stdout until EOF, then wait for the exit status.
///
/// Resolves to the number of chunks read and the exit code.
async fn forward_output(
    child: &mut Child,
    stdout: Option<ChildStdout>,
    spec: &CommandSpec,
    sink: &mut OutputSink,
) -> Result<(usize, i32), ExecError> {
    let io_err = |source| ExecError::Io {
        command: spec.executable.clone(),
        source,
    };

    let mut chunks = 0;
    if let Some(mut stdout) = stdout {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = stdout.read(&mut buf).await.map_err(io_err)?;
            if n == 0 {
                break;
            }
            trace!(command = %spec.name, bytes = n, "stdout chunk");
            chunks += 1;
            sink.chunk(&buf[..n]).await;
        }
    }

    let status = child.wait().await.map_err(io_err)?;
    Ok((chunks, status.code().unwrap_or(-1)))
}

async fn drain_stderr<R: AsyncRead + Unpin>(mut stderr: R, name: &str) -> String {
    let mut bytes = Vec::new();
    if let Err(e) = stderr.read_to_end(&mut bytes).await {
        debug!(command = %name, error = %e, "stderr read failed");
    }
    let text = String::from_utf8_lossy(&bytes).into_owned();
    if !text.is_empty() {
        debug!(command = %name, "stderr: {}", text.trim_end());
    }
    text
}
