// src/config/model.rs

use serde::Deserialize;

use crate::exec::retry::DEFAULT_BACKOFF;
use crate::types::DEFAULT_SEPARATOR;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [run]
/// max_processes = 4
/// retries = 3
/// backoff_ms = 250
/// name_separator = ","
///
/// [output]
/// color = true
/// silent = false
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// `[run]` section: scheduling and retry defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Concurrency cap. Absent means unbounded.
    #[serde(default)]
    pub max_processes: Option<usize>,

    /// Attempts per command (>= 1).
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Constant delay between attempts, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_name_separator")]
    pub name_separator: String,
}

fn default_retries() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    DEFAULT_BACKOFF.as_millis() as u64
}

fn default_name_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_processes: None,
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            name_separator: default_name_separator(),
        }
    }
}

/// `[output]` section: presentation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_color")]
    pub color: bool,

    #[serde(default)]
    pub silent: bool,
}

fn default_color() -> bool {
    true
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            color: default_color(),
            silent: false,
        }
    }
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` or [`ConfigFile::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub run: RunSection,
    pub output: OutputSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(run: RunSection, output: OutputSection) -> Self {
        Self { run, output }
    }
}
