//! `termfix selectors`: list the registered selectors.

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{Config, ExitStatus, QuickFixSelector, SelectorType};
use crate::services::QuickFixService;

#[derive(Args, Debug)]
pub struct SelectorsArgs {
    /// Additional contributions files
    #[arg(long = "contributions", value_name = "FILE")]
    pub contributions: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SelectorOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub selector_type: SelectorType,
    pub command_exit_result: ExitStatus,
    pub command_line_matcher: String,
    pub output_matcher: Option<String>,
    /// Whether a provider is available to serve the selector
    pub has_provider: bool,
    pub disabled: bool,
}

impl SelectorOutput {
    fn new(selector: &QuickFixSelector, service: &QuickFixService) -> Self {
        let has_provider = match selector.selector_type() {
            SelectorType::UnresolvedExtension => {
                service.provider_registry().contains(selector.id())
            }
            SelectorType::Internal | SelectorType::ResolvedExtension => true,
        };

        Self {
            id: selector.id().to_string(),
            selector_type: selector.selector_type(),
            command_exit_result: selector.options.command_exit_result,
            command_line_matcher: selector.options.command_line_matcher.to_string(),
            output_matcher: selector
                .options
                .output_matcher
                .as_ref()
                .map(|m| m.line_matcher.to_string()),
            has_provider,
            disabled: service.config().is_disabled(selector.id()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectorListOutput {
    pub selectors: Vec<SelectorOutput>,
    pub total: usize,
}

impl CommandOutput for SelectorListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "type", "exit", "command line", "output", "provider"]);
        for selector in &self.selectors {
            let provider = match (selector.disabled, selector.has_provider) {
                (true, _) => "disabled",
                (false, true) => "yes",
                (false, false) => "no",
            };
            table.add_row(vec![
                Cell::new(&selector.id),
                Cell::new(selector.selector_type),
                Cell::new(selector.command_exit_result),
                Cell::new(truncate(&selector.command_line_matcher, 40)),
                Cell::new(
                    selector
                        .output_matcher
                        .as_deref()
                        .map_or_else(|| "-".to_string(), |m| truncate(m, 40)),
                ),
                Cell::new(provider),
            ]);
        }
        render_list("selector", "selectors", &table, self.total)
    }
}

pub async fn execute(args: SelectorsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, _contributions) = super::bootstrap(config, &args.contributions);

    let selectors: Vec<SelectorOutput> = service
        .terminal_quick_fixes()
        .await
        .iter()
        .map(|selector| SelectorOutput::new(selector, &service))
        .collect();

    let out = SelectorListOutput {
        total: selectors.len(),
        selectors,
    };
    output(&out, json_mode);
    Ok(())
}
