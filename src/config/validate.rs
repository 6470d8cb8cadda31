// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ConcurrentlyError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ConcurrentlyError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.run, raw.output))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.run.retries == 0 {
        return Err(ConcurrentlyError::ConfigError(
            "[run].retries must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.run.max_processes == Some(0) {
        return Err(ConcurrentlyError::ConfigError(
            "[run].max_processes must be >= 1 when set (got 0)".to_string(),
        ));
    }

    if cfg.run.name_separator.is_empty() {
        return Err(ConcurrentlyError::ConfigError(
            "[run].name_separator must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg, ConfigFile::default());
        assert_eq!(cfg.run.retries, 1);
        assert_eq!(cfg.run.name_separator, ",");
        assert!(cfg.output.color);
    }

    #[test]
    fn full_file_is_read() {
        let cfg = parse(
            r#"
[run]
max_processes = 4
retries = 3
backoff_ms = 250
name_separator = "|"

[output]
color = false
silent = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.run.max_processes, Some(4));
        assert_eq!(cfg.run.retries, 3);
        assert_eq!(cfg.run.backoff_ms, 250);
        assert_eq!(cfg.run.name_separator, "|");
        assert!(!cfg.output.color);
        assert!(cfg.output.silent);
    }

    #[test]
    fn zero_retries_is_rejected() {
        let err = parse("[run]\nretries = 0\n").unwrap_err();
        assert!(matches!(err, ConcurrentlyError::ConfigError(msg) if msg.contains("retries")));
    }

    #[test]
    fn zero_max_processes_is_rejected() {
        let err = parse("[run]\nmax_processes = 0\n").unwrap_err();
        assert!(matches!(err, ConcurrentlyError::ConfigError(msg) if msg.contains("max_processes")));
    }

    #[test]
    fn empty_separator_is_rejected() {
        assert!(parse("[run]\nname_separator = \"\"\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse("[run]\nspinner = true\n"),
            Err(ConcurrentlyError::TomlError(_))
        ));
    }
}
