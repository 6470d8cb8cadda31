// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConcurrentlyError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty process list")]
    EmptyCommandList,

    #[error("Name mismatch: {names} names given for {commands} commands")]
    NameMismatch { names: usize, commands: usize },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Why a single attempt at running a command failed.
///
/// Everything except `Cancelled` is retried by the retry policy and, once
/// attempts run out, rendered into the command's output.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading output of `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code}{}", stderr_suffix(.stderr))]
    ExitStatus {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("command task ended without reporting a result")]
    Lost,
}

impl ExecError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

pub type Result<T> = std::result::Result<T, ConcurrentlyError>;
