//! Results of matching a selector against a finished command.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::pattern::RegexMatch;

/// Output side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMatch {
    /// First match in the window
    pub regex_match: RegexMatch,

    /// Every match in the window; only more than one with `multiple_matches`
    pub matches: Vec<RegexMatch>,

    /// Matched lines, as indices into `output_lines`
    pub line_range: Range<usize>,

    /// Index of the window's first line in the full captured output
    pub window_start: usize,

    /// The lines of the window that was searched
    pub output_lines: Vec<String>,
}

impl OutputMatch {
    /// Window lines after the matched range.
    pub fn lines_after_match(&self) -> &[String] {
        let end = self.line_range.end.min(self.output_lines.len());
        &self.output_lines[end..]
    }
}

/// Everything a provider learns about why its selector fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMatchResult {
    pub command_line: String,
    pub command_line_match: RegexMatch,

    /// Present iff the selector declared an output matcher and it matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_match: Option<OutputMatch>,
}

impl CommandMatchResult {
    /// Look up a capture by name, preferring the output match.
    pub fn group(&self, name: &str) -> Option<&str> {
        self.output_match
            .as_ref()
            .and_then(|m| m.regex_match.name(name))
            .or_else(|| self.command_line_match.name(name))
    }
}
