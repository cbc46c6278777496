//! `termfix evaluate`: run a finished command through the quick fix engine.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{Config, ExitStatus, QuickFix, TerminalCommand};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Command line as it was typed
    #[arg(short, long)]
    pub command: String,

    /// Exit code the command finished with
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub exit_code: i32,

    /// File with the captured output, or "-" to read stdin
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Working directory the command ran in
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Additional contributions files
    #[arg(long = "contributions", value_name = "FILE")]
    pub contributions: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateOutput {
    pub command: String,
    pub exit_status: ExitStatus,
    pub fixes: Vec<QuickFix>,
}

impl CommandOutput for EvaluateOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["#", "type", "action", "source"]);
        for (index, fix) in self.fixes.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(fix.fix_type()),
                Cell::new(truncate(&fix.label(), 80)),
                Cell::new(fix.source().unwrap_or("-")),
            ]);
        }
        render_list("quick fix", "quick fixes", &table, self.fixes.len())
    }
}

pub async fn execute(args: EvaluateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let output_lines = match &args.output {
        Some(path) => Some(read_output(path).await?),
        None => None,
    };

    let (service, contributions) = super::bootstrap(config, &args.contributions);
    debug!(
        contributed = contributions.selector_ids.len(),
        "Quick fix service ready"
    );

    let mut command = TerminalCommand::from_exit_code(args.command, args.exit_code);
    if let Some(cwd) = args.cwd {
        command = command.with_cwd(cwd);
    }

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let fixes = service
        .evaluate(&command, output_lines.as_deref(), &cancel)
        .await;
    ctrl_c.abort();

    let out = EvaluateOutput {
        command: command.command_line,
        exit_status: command.exit_status,
        fixes,
    };
    output(&out, json_mode);
    Ok(())
}

async fn read_output(path: &Path) -> Result<Vec<String>> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read command output from stdin")?;
        text
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read command output from {}", path.display()))?
    };
    Ok(text.lines().map(str::to_string).collect())
}
