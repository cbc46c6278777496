//! Quick fix selectors: declarative rules describing when a fix may apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::command::ExitStatus;
use super::match_result::CommandMatchResult;
use super::pattern::Pattern;
use super::quick_fix::ProvidedFixes;
use crate::domain::ports::QuickFixProvider;

/// Where an output window is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputAnchor {
    /// Count from the first captured line.
    ///
    /// The engine caps output to the last `max_output_lines` lines before
    /// windowing, so for longer output this is the first line of that tail.
    Top,
    /// Count back from the last captured line
    #[default]
    Bottom,
}

/// Pattern over captured output, bounded to a window of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMatcher {
    /// Pattern tested against the window
    pub line_matcher: Pattern,

    #[serde(default)]
    pub anchor: OutputAnchor,

    /// Lines skipped from the anchor before the window starts
    #[serde(default)]
    pub offset: usize,

    /// Window size in lines
    #[serde(default = "default_window_length")]
    pub length: usize,

    /// Collect every matching line instead of only the first match
    #[serde(default)]
    pub multiple_matches: bool,
}

const fn default_window_length() -> usize {
    20
}

impl OutputMatcher {
    /// Matcher over the last 20 lines of output.
    pub fn new(line_matcher: impl Into<Pattern>) -> Self {
        Self {
            line_matcher: line_matcher.into(),
            anchor: OutputAnchor::Bottom,
            offset: 0,
            length: default_window_length(),
            multiple_matches: false,
        }
    }

    #[must_use]
    pub const fn anchor(mut self, anchor: OutputAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub const fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub const fn multiple_matches(mut self, multiple: bool) -> Self {
        self.multiple_matches = multiple;
        self
    }

    /// Slice of `lines` this matcher looks at, with the slice's start index.
    ///
    /// The window is clamped to the available lines; an offset past the end
    /// yields an empty window.
    pub fn window<'a>(&self, lines: &'a [String]) -> (usize, &'a [String]) {
        let total = lines.len();
        let (start, end) = match self.anchor {
            OutputAnchor::Top => {
                let start = self.offset.min(total);
                (start, start.saturating_add(self.length).min(total))
            }
            OutputAnchor::Bottom => {
                let end = total.saturating_sub(self.offset);
                (end.saturating_sub(self.length), end)
            }
        };
        (start, &lines[start..end])
    }
}

/// Declarative part of a selector: the record handed to extension providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFixOptions {
    /// Unique selector id; also the id of the provider that serves it
    pub id: String,

    /// Pattern over the full command line
    pub command_line_matcher: Pattern,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_matcher: Option<OutputMatcher>,

    /// Exit status the command must have for the selector to apply
    pub command_exit_result: ExitStatus,
}

impl QuickFixOptions {
    pub fn new(
        id: impl Into<String>,
        command_line_matcher: impl Into<Pattern>,
        command_exit_result: ExitStatus,
    ) -> Self {
        Self {
            id: id.into(),
            command_line_matcher: command_line_matcher.into(),
            output_matcher: None,
            command_exit_result,
        }
    }

    #[must_use]
    pub fn with_output_matcher(mut self, matcher: OutputMatcher) -> Self {
        self.output_matcher = Some(matcher);
        self
    }

    /// Patterns of this selector that failed to compile.
    pub fn invalid_patterns(&self) -> Vec<&Pattern> {
        std::iter::once(&self.command_line_matcher)
            .chain(self.output_matcher.as_ref().map(|m| &m.line_matcher))
            .filter(|p| !p.is_valid())
            .collect()
    }
}

/// How a selector's fixes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorType {
    Internal,
    ResolvedExtension,
    UnresolvedExtension,
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::ResolvedExtension => write!(f, "resolved-extension"),
            Self::UnresolvedExtension => write!(f, "unresolved-extension"),
        }
    }
}

/// Synchronous callback of an internal selector.
pub type InternalCallback =
    Arc<dyn Fn(&CommandMatchResult) -> anyhow::Result<ProvidedFixes> + Send + Sync>;

/// Executable side of a selector.
#[derive(Clone)]
pub enum SelectorKind {
    /// Built-in callback, called inline with the match result
    Internal(InternalCallback),
    /// Provider supplied together with the selector
    Resolved(Arc<dyn QuickFixProvider>),
    /// Provider looked up by id in the provider registry at evaluation time
    Unresolved,
}

impl SelectorKind {
    pub const fn selector_type(&self) -> SelectorType {
        match self {
            Self::Internal(_) => SelectorType::Internal,
            Self::Resolved(_) => SelectorType::ResolvedExtension,
            Self::Unresolved => SelectorType::UnresolvedExtension,
        }
    }
}

/// A registered selector.
#[derive(Clone)]
pub struct QuickFixSelector {
    pub options: QuickFixOptions,
    pub kind: SelectorKind,
}

impl QuickFixSelector {
    pub fn internal<F>(options: QuickFixOptions, callback: F) -> Self
    where
        F: Fn(&CommandMatchResult) -> anyhow::Result<ProvidedFixes> + Send + Sync + 'static,
    {
        Self {
            options,
            kind: SelectorKind::Internal(Arc::new(callback)),
        }
    }

    pub fn resolved(options: QuickFixOptions, provider: Arc<dyn QuickFixProvider>) -> Self {
        Self {
            options,
            kind: SelectorKind::Resolved(provider),
        }
    }

    pub const fn unresolved(options: QuickFixOptions) -> Self {
        Self {
            options,
            kind: SelectorKind::Unresolved,
        }
    }

    pub fn id(&self) -> &str {
        &self.options.id
    }

    pub const fn selector_type(&self) -> SelectorType {
        self.kind.selector_type()
    }

    pub fn applies_to(&self, exit_status: ExitStatus) -> bool {
        self.options.command_exit_result == exit_status
    }
}

impl fmt::Debug for QuickFixSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickFixSelector")
            .field("options", &self.options)
            .field("type", &self.selector_type())
            .finish()
    }
}
