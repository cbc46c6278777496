//! Built-in quick fixes for common git and port problems.
//!
//! All of them are internal selectors: synchronous callbacks over the match
//! result, registered under fixed ids.

use regex::NoExpand;
use url::Url;

use crate::domain::errors::QuickFixError;
use crate::domain::models::{
    CommandMatchResult, ExitStatus, OutputMatcher, Pattern, ProvidedFixes, QuickFix,
    QuickFixOptions, QuickFixSelector,
};
use crate::services::quick_fix_service::QuickFixService;

pub const GIT_TWO_DASHES: &str = "git-two-dashes";
pub const GIT_SIMILAR: &str = "git-similar";
pub const GIT_PUSH_SET_UPSTREAM: &str = "git-push-set-upstream";
pub const GIT_CREATE_PR: &str = "git-create-pr";
pub const FREE_PORT: &str = "free-port";

const GIT_COMMAND_LINE: &str = r"\bgit\b";
const GIT_PUSH_COMMAND_LINE: &str = r"\bgit\s+push\b";
const GIT_TWO_DASHES_OUTPUT: &str = r"error: did you mean `--(?P<arg>[^`]+)` \(with two dashes\)\?";
const GIT_SIMILAR_OUTPUT: &str = r"most similar commands? (?:is|are)";
const GIT_PUSH_OUTPUT: &str = r"git push --set-upstream origin (?P<branch>\S+)";
const GIT_CREATE_PR_OUTPUT: &str =
    r"remote:\s*(?P<link>https://github\.com/\S+/\S+/pull/new/\S+)";
const FREE_PORT_OUTPUT: &str = concat!(
    r"(?:address already in use (?:0\.0\.0\.0|127\.0\.0\.1|localhost|::):",
    r"|Unable to bind \S*:",
    r"|can't listen on port ",
    r"|listen EADDRINUSE \S*:)",
    r"(\d{4,5})",
);

/// The built-in selectors, in registration order.
pub fn builtin_selectors() -> Vec<QuickFixSelector> {
    vec![
        git_two_dashes(),
        git_similar(),
        git_push_set_upstream(),
        git_create_pr(),
        free_port(),
    ]
}

/// Register every built-in selector with `service`.
pub fn register_builtin_providers(service: &QuickFixService) -> usize {
    let selectors = builtin_selectors();
    let count = selectors.len();
    for selector in selectors {
        service.register_command_selector(selector);
    }
    tracing::debug!(count, "Registered built-in quick fixes");
    count
}

fn output_group<'a>(result: &'a CommandMatchResult, index: usize) -> Option<&'a str> {
    result
        .output_match
        .as_ref()
        .and_then(|m| m.regex_match.get(index))
}

/// Long option typed with a single dash, e.g. `git checkout -force`.
fn git_two_dashes() -> QuickFixSelector {
    let options = QuickFixOptions::new(GIT_TWO_DASHES, GIT_COMMAND_LINE, ExitStatus::Error)
        .with_output_matcher(OutputMatcher::new(GIT_TWO_DASHES_OUTPUT).length(2));

    QuickFixSelector::internal(options, |result| {
        let Some(arg) = result.group("arg") else {
            return Ok(ProvidedFixes::None);
        };
        let fixed = result
            .command_line
            .replacen(&format!("-{arg}"), &format!("--{arg}"), 1);
        Ok(QuickFix::command(GIT_TWO_DASHES, fixed).with_new_line().into())
    })
}

/// `git stauts` followed by git's list of similar subcommands.
fn git_similar() -> QuickFixSelector {
    let options = QuickFixOptions::new(GIT_SIMILAR, GIT_COMMAND_LINE, ExitStatus::Error)
        .with_output_matcher(OutputMatcher::new(GIT_SIMILAR_OUTPUT).length(10));
    let subcommand = Pattern::new(r"\bgit\s+\S+");

    QuickFixSelector::internal(options, move |result| {
        let (Some(subcommand), Some(output)) = (subcommand.regex(), &result.output_match) else {
            return Ok(ProvidedFixes::None);
        };

        let fixes: Vec<QuickFix> = output
            .lines_after_match()
            .iter()
            .map(|line| line.trim())
            .take_while(|line| !line.is_empty())
            .map(|suggestion| {
                let replacement = format!("git {suggestion}");
                let fixed = subcommand.replace(&result.command_line, NoExpand(&replacement));
                QuickFix::command(GIT_SIMILAR, fixed)
            })
            .collect();
        Ok(fixes.into())
    })
}

fn git_push_set_upstream() -> QuickFixSelector {
    let options =
        QuickFixOptions::new(GIT_PUSH_SET_UPSTREAM, GIT_PUSH_COMMAND_LINE, ExitStatus::Error)
            .with_output_matcher(OutputMatcher::new(GIT_PUSH_OUTPUT).length(8));

    QuickFixSelector::internal(options, |result| {
        let Some(branch) = result.group("branch") else {
            return Ok(ProvidedFixes::None);
        };
        Ok(QuickFix::command(
            GIT_PUSH_SET_UPSTREAM,
            format!("git push --set-upstream origin {branch}"),
        )
        .with_new_line()
        .into())
    })
}

/// Successful push of a new branch: offer the "create pull request" link.
fn git_create_pr() -> QuickFixSelector {
    let options = QuickFixOptions::new(GIT_CREATE_PR, GIT_PUSH_COMMAND_LINE, ExitStatus::Success)
        .with_output_matcher(OutputMatcher::new(GIT_CREATE_PR_OUTPUT).length(5));

    QuickFixSelector::internal(options, |result| {
        let Some(link) = result.group("link") else {
            return Ok(ProvidedFixes::None);
        };
        let uri = parse_uri(link)?;
        Ok(QuickFix::opener(GIT_CREATE_PR, uri).into())
    })
}

fn free_port() -> QuickFixSelector {
    let options = QuickFixOptions::new(FREE_PORT, ".+", ExitStatus::Error)
        .with_output_matcher(OutputMatcher::new(FREE_PORT_OUTPUT).length(30));

    QuickFixSelector::internal(options, |result| {
        let Some(port) = output_group(result, 1) else {
            return Ok(ProvidedFixes::None);
        };
        let port = parse_port(port)?;
        Ok(QuickFix::port(FREE_PORT, port).into())
    })
}

pub(crate) fn parse_uri(raw: &str) -> Result<Url, QuickFixError> {
    Url::parse(raw).map_err(|err| QuickFixError::InvalidUri {
        uri: raw.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn parse_port(raw: &str) -> Result<u16, QuickFixError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(QuickFixError::InvalidPort(raw.to_string())),
    }
}
