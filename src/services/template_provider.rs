//! Provider backed by declarative fix templates.
//!
//! Templates reference capture groups as `${name}` or `${1}`. Output-match
//! captures win over command-line captures of the same name or index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::errors::QuickFixResult;
use crate::domain::models::{
    CommandMatchResult, ProvidedFixes, QuickFix, QuickFixOptions, TerminalCommand,
};
use crate::domain::ports::QuickFixProvider;
use crate::services::builtin_providers::{parse_port, parse_uri};
use crate::services::match_engine::build_match_result;

/// A fix with capture references still to be filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixTemplate {
    Command {
        terminal_command: String,
        #[serde(default)]
        add_new_line: bool,
    },
    Opener {
        uri: String,
    },
    Port {
        port: String,
    },
}

impl FixTemplate {
    /// Build the fix for `result`.
    ///
    /// `Ok(None)` when a referenced capture did not participate in the match.
    pub fn instantiate(&self, id: &str, result: &CommandMatchResult) -> QuickFixResult<Option<QuickFix>> {
        let fix = match self {
            Self::Command {
                terminal_command,
                add_new_line,
            } => {
                let Some(rendered) = render(terminal_command, result) else {
                    return Ok(None);
                };
                let fix = QuickFix::command(id, rendered);
                if *add_new_line {
                    fix.with_new_line()
                } else {
                    fix
                }
            }
            Self::Opener { uri } => {
                let Some(rendered) = render(uri, result) else {
                    return Ok(None);
                };
                QuickFix::opener(id, parse_uri(&rendered)?)
            }
            Self::Port { port } => {
                let Some(rendered) = render(port, result) else {
                    return Ok(None);
                };
                QuickFix::port(id, parse_port(&rendered)?)
            }
        };
        Ok(Some(fix))
    }
}

/// Substitute `${...}` references. `None` if any reference is unresolved.
pub fn render(template: &str, result: &CommandMatchResult) -> Option<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated reference is literal text
            rendered.push_str(&rest[start..]);
            return Some(rendered);
        };
        rendered.push_str(lookup(result, &after[..end])?);
        rest = &after[end + 1..];
    }

    rendered.push_str(rest);
    Some(rendered)
}

fn lookup<'a>(result: &'a CommandMatchResult, reference: &str) -> Option<&'a str> {
    match reference.parse::<usize>() {
        Ok(index) => result
            .output_match
            .as_ref()
            .and_then(|m| m.regex_match.get(index))
            .or_else(|| result.command_line_match.get(index)),
        Err(_) => result.group(reference),
    }
}

/// Serves an unresolved selector from a list of fix templates.
#[derive(Debug, Clone)]
pub struct TemplateProvider {
    templates: Vec<FixTemplate>,
}

impl TemplateProvider {
    pub fn new(templates: Vec<FixTemplate>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[FixTemplate] {
        &self.templates
    }
}

#[async_trait]
impl QuickFixProvider for TemplateProvider {
    async fn provide_quick_fixes(
        &self,
        command: &TerminalCommand,
        output: Option<&[String]>,
        options: &QuickFixOptions,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ProvidedFixes> {
        let Some(result) = build_match_result(options, &command.command_line, output) else {
            return Ok(ProvidedFixes::None);
        };

        let mut fixes = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            if cancel.is_cancelled() {
                break;
            }
            match template.instantiate(&options.id, &result) {
                Ok(Some(fix)) => fixes.push(fix),
                Ok(None) => debug!(selector_id = %options.id, "Template references a missing capture"),
                Err(err) => warn!(selector_id = %options.id, error = %err, "Skipping invalid templated fix"),
            }
        }
        Ok(fixes.into())
    }
}
