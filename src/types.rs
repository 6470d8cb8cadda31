// src/types.rs

use std::fmt;

use crate::errors::{ConcurrentlyError, Result};

/// Default separator between commands in the command-list argument.
pub const DEFAULT_SEPARATOR: &str = ",";

/// One named external command to execute.
///
/// `name` is only ever used as a display prefix; scheduling looks at list
/// position, never at the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub executable: String,
}

impl CommandSpec {
    /// Build a spec whose display name is the command line itself.
    pub fn new(executable: impl Into<String>) -> Self {
        let executable = executable.into().trim().to_string();
        Self {
            name: executable.clone(),
            executable,
        }
    }

    pub fn named(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            executable: executable.into().trim().to_string(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Split a delimited command list into specs.
///
/// Entries are trimmed and blank entries dropped, so `"ls, pwd,"` yields two
/// commands. When `names` is given it is split with the same separator and
/// must produce exactly one name per command.
pub fn parse_commands(
    input: &str,
    separator: &str,
    names: Option<&str>,
) -> Result<Vec<CommandSpec>> {
    let executables = split_list(input, separator);
    if executables.is_empty() {
        return Err(ConcurrentlyError::EmptyCommandList);
    }

    let Some(names) = names else {
        return Ok(executables.into_iter().map(CommandSpec::new).collect());
    };

    let names = split_list(names, separator);
    if names.len() != executables.len() {
        return Err(ConcurrentlyError::NameMismatch {
            names: names.len(),
            commands: executables.len(),
        });
    }

    Ok(names
        .into_iter()
        .zip(executables)
        .map(|(name, exe)| CommandSpec::named(name, exe))
        .collect())
}

fn split_list<'a>(input: &'a str, separator: &str) -> Vec<&'a str> {
    input
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_on_separator() {
        let cmds = parse_commands("ls, pwd ,echo hi", ",", None).unwrap();
        let exes: Vec<_> = cmds.iter().map(|c| c.executable.as_str()).collect();
        assert_eq!(exes, vec!["ls", "pwd", "echo hi"]);
        assert_eq!(cmds[2].name, "echo hi");
    }

    #[test]
    fn custom_separator_keeps_commas_inside_commands() {
        let cmds = parse_commands("echo a,b|pwd", "|", None).unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].executable, "echo a,b");
    }

    #[test]
    fn blank_entries_are_dropped() {
        let cmds = parse_commands(",ls,, ,pwd,", ",", None).unwrap();
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(
            parse_commands(" , ", ",", None),
            Err(ConcurrentlyError::EmptyCommandList)
        ));
    }

    #[test]
    fn names_are_zipped_with_commands() {
        let cmds = parse_commands("ls -la,pwd", ",", Some("list, where")).unwrap();
        assert_eq!(cmds[0], CommandSpec::named("list", "ls -la"));
        assert_eq!(cmds[1], CommandSpec::named("where", "pwd"));
    }

    #[test]
    fn name_count_must_match() {
        let err = parse_commands("ls,pwd", ",", Some("one")).unwrap_err();
        assert!(matches!(
            err,
            ConcurrentlyError::NameMismatch {
                names: 1,
                commands: 2
            }
        ));
    }
}
