// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every option is optional here so that a value missing on the command line
//! can fall back to the config file, and then to the built-in default. See
//! [`crate::config::Settings::resolve`].

use clap::{Parser, ValueEnum};

/// Command-line arguments for `concurrently`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "concurrently",
    version,
    about = "Run several commands at once, with a concurrency cap and retries.",
    long_about = None,
    after_help = "Examples:\n  \
        concurrently \"ls,cat file.txt\"\n  \
        concurrently -m 4 \"ls,cat file.txt\"\n  \
        concurrently --name-separator \"|\" \"ls|cat file.txt\"\n  \
        concurrently -s \"cargo build|npm start\""
)]
pub struct CliArgs {
    /// Commands to execute concurrently, joined by the name separator.
    #[arg(value_name = "COMMANDS")]
    pub commands: String,

    /// Maximum number of commands running at the same time.
    #[arg(
        short = 'm',
        long,
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_processes: Option<usize>,

    /// Attempts per command before its error is printed (1 = no retry).
    #[arg(short = 'r', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: Option<u32>,

    /// Delay between two attempts of the same command, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// String used to split the command list (and `--names`).
    #[arg(long, value_name = "SEP")]
    pub name_separator: Option<String>,

    /// Display names for the commands, joined by the name separator.
    #[arg(long, value_name = "NAMES")]
    pub names: Option<String>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Do not print command output.
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Path to a TOML config file.
    ///
    /// Default: `Concurrently.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CONCURRENTLY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_short_flags() {
        let args = CliArgs::try_parse_from(["concurrently", "-m", "2", "-r", "3", "-s", "ls,pwd"])
            .unwrap();
        assert_eq!(args.commands, "ls,pwd");
        assert_eq!(args.max_processes, Some(2));
        assert_eq!(args.retries, Some(3));
        assert!(args.silent);
        assert!(!args.no_color);
    }

    #[test]
    fn zero_retries_is_rejected() {
        assert!(CliArgs::try_parse_from(["concurrently", "-r", "0", "ls"]).is_err());
    }

    #[test]
    fn zero_max_processes_is_rejected() {
        assert!(CliArgs::try_parse_from(["concurrently", "-m", "0", "ls"]).is_err());
        assert!(CliArgs::try_parse_from(["concurrently", "--max-processes", "0", "ls"]).is_err());
        assert!(CliArgs::try_parse_from(["concurrently", "-m", "1", "ls"]).is_ok());
    }

    #[test]
    fn commands_are_required() {
        assert!(CliArgs::try_parse_from(["concurrently"]).is_err());
    }
}
