//! Regular-expression patterns used by selectors.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::errors::QuickFixError;

/// A regular expression compiled once, when the pattern is created.
///
/// A pattern that fails to compile is kept rather than rejected: it reports
/// [`Pattern::is_valid`] as `false` and never matches anything.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    /// Compile a pattern from its source text.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        Self { source, compiled }
    }

    /// Compile a pattern, failing on invalid syntax.
    pub fn try_new(source: impl Into<String>) -> Result<Self, QuickFixError> {
        let pattern = Self::new(source);
        match pattern.error() {
            Some(err) => Err(QuickFixError::InvalidPattern {
                pattern: pattern.source.clone(),
                reason: err.to_string(),
            }),
            None => Ok(pattern),
        }
    }

    /// The pattern's source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_ok()
    }

    /// The compile error, if the pattern is invalid.
    pub fn error(&self) -> Option<&regex::Error> {
        self.compiled.as_ref().err()
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.compiled.as_ref().ok()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex().is_some_and(|re| re.is_match(haystack))
    }

    /// Match against `haystack` and capture all groups into an owned value.
    pub fn captures(&self, haystack: &str) -> Option<RegexMatch> {
        let re = self.regex()?;
        re.captures(haystack)
            .map(|caps| RegexMatch::from_captures(re, &caps))
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            compiled: Ok(regex),
        }
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Owned copy of a regex match and its capture groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexMatch {
    /// Full text of the match (group 0)
    pub text: String,

    /// Byte offset of the match start in the haystack
    pub start: usize,

    /// Byte offset of the match end in the haystack
    pub end: usize,

    /// Numbered groups, starting at group 1
    pub groups: Vec<Option<String>>,

    /// Named groups that participated in the match
    pub named: BTreeMap<String, String>,
}

impl RegexMatch {
    pub(crate) fn from_captures(re: &Regex, caps: &Captures<'_>) -> Self {
        let whole = caps.get(0);
        let groups = caps
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let named = re
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Self {
            text: whole.map(|m| m.as_str().to_string()).unwrap_or_default(),
            start: whole.map_or(0, |m| m.start()),
            end: whole.map_or(0, |m| m.end()),
            groups,
            named,
        }
    }

    /// Group by index; `0` is the whole match.
    pub fn get(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some(&self.text);
        }
        self.groups.get(index - 1).and_then(|g| g.as_deref())
    }

    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// First numbered group that participated in the match.
    pub fn first_group(&self) -> Option<&str> {
        self.groups.iter().flatten().next().map(String::as_str)
    }
}
