//! Quick fix actions produced by providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Discriminant of a [`QuickFix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickFixType {
    Command,
    Opener,
    Port,
}

impl fmt::Display for QuickFixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Opener => write!(f, "opener"),
            Self::Port => write!(f, "port"),
        }
    }
}

/// A suggested follow-up action for a finished command.
///
/// `source` names the selector that produced the fix. Providers may leave it
/// unset; aggregation fills it in with the producing selector's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuickFix {
    /// Put a command into the terminal, optionally running it
    Command {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        terminal_command: String,
        #[serde(default)]
        add_new_line: bool,
    },

    /// Open a URI
    Opener {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        uri: Url,
    },

    /// Free or forward a port that a command reported
    Port {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        port: u16,
    },
}

/// Identity used to collapse duplicate fixes: type plus primary payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Command(String),
    Opener(String),
    Port(u16),
}

impl QuickFix {
    pub fn command(id: impl Into<String>, terminal_command: impl Into<String>) -> Self {
        Self::Command {
            id: id.into(),
            source: None,
            terminal_command: terminal_command.into(),
            add_new_line: false,
        }
    }

    pub fn opener(id: impl Into<String>, uri: Url) -> Self {
        Self::Opener {
            id: id.into(),
            source: None,
            uri,
        }
    }

    pub fn port(id: impl Into<String>, port: u16) -> Self {
        Self::Port {
            id: id.into(),
            source: None,
            port,
        }
    }

    /// Mark a command fix to be executed immediately (appends a newline).
    /// No effect on other fix types.
    #[must_use]
    pub fn with_new_line(mut self) -> Self {
        if let Self::Command { add_new_line, .. } = &mut self {
            *add_new_line = true;
        }
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        *self.source_mut() = Some(source.into());
        self
    }

    pub const fn fix_type(&self) -> QuickFixType {
        match self {
            Self::Command { .. } => QuickFixType::Command,
            Self::Opener { .. } => QuickFixType::Opener,
            Self::Port { .. } => QuickFixType::Port,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Command { id, .. } | Self::Opener { id, .. } | Self::Port { id, .. } => id,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Command { source, .. }
            | Self::Opener { source, .. }
            | Self::Port { source, .. } => source.as_deref(),
        }
    }

    fn source_mut(&mut self) -> &mut Option<String> {
        match self {
            Self::Command { source, .. }
            | Self::Opener { source, .. }
            | Self::Port { source, .. } => source,
        }
    }

    /// Set the source unless the provider already chose one.
    pub fn set_source_if_unset(&mut self, source: &str) {
        let slot = self.source_mut();
        if slot.as_deref().is_none_or(str::is_empty) {
            *slot = Some(source.to_string());
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        match self {
            Self::Command {
                terminal_command, ..
            } => DedupKey::Command(terminal_command.clone()),
            Self::Opener { uri, .. } => DedupKey::Opener(uri.as_str().to_string()),
            Self::Port { port, .. } => DedupKey::Port(*port),
        }
    }

    /// Human-readable label, as a menu would show it.
    pub fn label(&self) -> String {
        match self {
            Self::Command {
                terminal_command, ..
            } => format!("Run: {terminal_command}"),
            Self::Opener { uri, .. } => format!("Open: {uri}"),
            Self::Port { port, .. } => format!("Free port {port}"),
        }
    }
}

/// What a provider hands back: nothing, a single fix, or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProvidedFixes {
    #[default]
    None,
    One(QuickFix),
    Many(Vec<QuickFix>),
}

impl ProvidedFixes {
    /// Normalize to a list.
    pub fn into_vec(self) -> Vec<QuickFix> {
        match self {
            Self::None => Vec::new(),
            Self::One(fix) => vec![fix],
            Self::Many(fixes) => fixes,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::One(_) => false,
            Self::Many(fixes) => fixes.is_empty(),
        }
    }
}

impl From<QuickFix> for ProvidedFixes {
    fn from(fix: QuickFix) -> Self {
        Self::One(fix)
    }
}

impl From<Vec<QuickFix>> for ProvidedFixes {
    fn from(fixes: Vec<QuickFix>) -> Self {
        Self::Many(fixes)
    }
}

impl From<Option<QuickFix>> for ProvidedFixes {
    fn from(fix: Option<QuickFix>) -> Self {
        fix.map_or(Self::None, Self::One)
    }
}
