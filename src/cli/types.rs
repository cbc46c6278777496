//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::evaluate::EvaluateArgs;
use crate::cli::commands::selectors::SelectorsArgs;

#[derive(Parser, Debug)]
#[command(name = "termfix")]
#[command(about = "Suggest quick fixes for finished terminal commands", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .termfix/config.yaml)
    #[arg(long, global = true, env = "TERMFIX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a finished command and its output
    Evaluate(EvaluateArgs),

    /// List the registered selectors
    Selectors(SelectorsArgs),

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::parse_from([
            "termfix",
            "evaluate",
            "--command",
            "git push",
            "--exit-code",
            "128",
            "--output",
            "-",
            "--contributions",
            "a.yaml",
            "--contributions",
            "b.yaml",
            "--json",
        ]);

        assert!(cli.json);
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.command, "git push");
                assert_eq!(args.exit_code, 128);
                assert_eq!(args.output, Some(PathBuf::from("-")));
                assert_eq!(args.contributions.len(), 2);
            }
            other => panic!("Expected evaluate, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_defaults_to_error_exit() {
        let cli = Cli::parse_from(["termfix", "evaluate", "-c", "make"]);
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.exit_code, 1);
                assert!(args.output.is_none());
            }
            other => panic!("Expected evaluate, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["termfix", "selectors", "--config", "custom.yaml", "-j"]);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(matches!(cli.command, Commands::Selectors(_)));
    }
}
