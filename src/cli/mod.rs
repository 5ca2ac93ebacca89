//! CLI module for fixforge
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod location;
pub mod output;

pub use location::ParsedLocation;
pub use output::{OutputContext, OutputFormat};

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, fixes::FixesArgs, rules::RulesArgs};

const LONG_ABOUT: &str = r#"
fixforge - code fixes for C# analyzer diagnostics

Loads every .cs file below the project root, locates the flagged node and
computes the fixes registered for the diagnostic's rule. Fixes may edit more
than one file.

QUICK START:
  1. List fixes:              fixforge fixes list src/Holder.cs:12:24
  2. Preview one:             fixforge fixes apply src/Holder.cs:12:24 --index 1
  3. Write it:                fixforge fixes apply src/Holder.cs:12:24 --index 1 --execute

RULES:
  CA2235  Mark all non-serializable fields
"#;

/// fixforge - code fixes for C# analyzer diagnostics
#[derive(Parser, Debug)]
#[command(name = "fixforge")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'fixforge <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (default: current directory)
    #[arg(long, global = true, env = "FIXFORGE_ROOT")]
    pub root: Option<PathBuf>,

    /// Output format (default: from config, json)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute and apply code fixes for a diagnostic
    Fixes(FixesArgs),

    /// List fix providers and the rules they handle
    Rules(RulesArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fixes_apply() {
        let cli = Cli::try_parse_from([
            "fixforge",
            "fixes",
            "apply",
            "src/Holder.cs:6:17",
            "--index",
            "1",
            "--execute",
        ])
        .unwrap();

        let Commands::Fixes(args) = cli.command else {
            panic!("expected fixes command");
        };
        match args.command {
            commands::fixes::FixesCommand::Apply {
                location,
                index,
                rule,
                execute,
            } => {
                assert_eq!(location.line, 6);
                assert_eq!(index, 1);
                assert_eq!(rule, "CA2235");
                assert!(execute);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
