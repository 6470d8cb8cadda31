// src/config/settings.rs

use std::time::Duration;

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::engine::BatchOptions;
use crate::exec::RetryConfig;
use crate::present::PresentOptions;

/// Effective options for one invocation: CLI flags over config file values
/// over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_processes: Option<usize>,
    pub attempts: u32,
    pub backoff: Duration,
    pub name_separator: String,
    pub color: bool,
    pub silent: bool,
}

impl Settings {
    pub fn resolve(args: &CliArgs, file: &ConfigFile) -> Self {
        let separator = args
            .name_separator
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| file.run.name_separator.clone());

        Self {
            max_processes: args.max_processes.or(file.run.max_processes),
            attempts: args.retries.unwrap_or(file.run.retries).max(1),
            backoff: Duration::from_millis(args.backoff_ms.unwrap_or(file.run.backoff_ms)),
            name_separator: separator,
            color: !args.no_color && file.output.color,
            silent: args.silent || file.output.silent,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            max_processes: self.max_processes,
            retry: RetryConfig {
                attempts: self.attempts,
                backoff: self.backoff,
                color: self.color,
            },
        }
    }

    pub fn present_options(&self) -> PresentOptions {
        PresentOptions {
            color: self.color,
            silent: self.silent,
        }
    }
}
