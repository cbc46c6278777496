//! Finished terminal commands, as handed over by the terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exit classification of a command, also used as a selector's exit filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    Error,
}

impl ExitStatus {
    /// Zero is success, anything else is an error.
    pub const fn from_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Error
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A command that finished running in a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalCommand {
    pub id: CommandId,

    /// Full command line as typed by the user
    pub command_line: String,

    /// Raw exit code, when the shell reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    pub exit_status: ExitStatus,

    /// Working directory the command ran in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl TerminalCommand {
    /// Create a command with an explicit exit classification and no exit code.
    pub fn new(command_line: impl Into<String>, exit_status: ExitStatus) -> Self {
        Self {
            id: CommandId::new(),
            command_line: command_line.into(),
            exit_code: None,
            exit_status,
            cwd: None,
        }
    }

    /// Create a command from the shell's exit code.
    pub fn from_exit_code(command_line: impl Into<String>, exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Self::new(command_line, ExitStatus::from_code(exit_code))
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn succeeded(&self) -> bool {
        self.exit_status == ExitStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_from_code() {
        assert_eq!(ExitStatus::from_code(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from_code(1), ExitStatus::Error);
        assert_eq!(ExitStatus::from_code(-1), ExitStatus::Error);
    }

    #[test]
    fn test_from_exit_code_keeps_code() {
        let cmd = TerminalCommand::from_exit_code("git push", 128);
        assert_eq!(cmd.exit_code, Some(128));
        assert_eq!(cmd.exit_status, ExitStatus::Error);
        assert!(!cmd.succeeded());
    }

    #[test]
    fn test_commands_get_distinct_ids() {
        let a = TerminalCommand::new("ls", ExitStatus::Success);
        let b = TerminalCommand::new("ls", ExitStatus::Success);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_exit_status_serialization() {
        let json = serde_json::to_string(&ExitStatus::Error).unwrap();
        assert_eq!(json, r#""error""#);
    }
}
