// parcours CLI - builds and queries the merged formation catalog

mod exit_codes;
mod merge;
mod search;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};
use merge::MergeArgs;
use search::SearchArgs;

#[derive(Parser)]
#[command(name = "parcours")]
#[command(about = "Merge Parcoursup formation statistics with establishment details")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the two CSV sources into merged_formations.json (default command)
    #[command(after_help = "\
Examples:
  parcours merge
  parcours merge --config merge.toml
  parcours merge --primary fichier_filtre.csv --supplementary ecoles.csv -o merged.json
  parcours merge --delimiter ';' --json")]
    Merge(MergeArgs),

    /// Validate a merge config without running
    #[command(after_help = "\
Examples:
  parcours validate merge.toml")]
    Validate {
        /// Path to the merge config (TOML)
        config: PathBuf,
    },

    /// Filter, sort and page through a merged dataset
    #[command(after_help = "\
Examples:
  parcours search merged_formations.json --region 'Île-de-France' --bac general
  parcours search merged_formations.json --detailed true --sort acceptance_rate --desc
  parcours search merged_formations.json --program 'Licence - Droit' --page 1 --size 50 --json")]
    Search(SearchArgs),

    /// Find up to five formations by establishment name (case-insensitive)
    Find {
        /// Merged dataset written by `parcours merge`
        merged: PathBuf,

        /// Text the establishment name must contain
        query: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// List distinct values of a field, optionally by accent-insensitive prefix
    #[command(after_help = "\
Examples:
  parcours suggest merged_formations.json region
  parcours suggest merged_formations.json commune 'sai'")]
    Suggest {
        /// Merged dataset written by `parcours merge`
        merged: PathBuf,

        /// establishment_name, region, department, academy, commune, program or establishment_status
        field: String,

        /// Prefix to match; omit for the first few values
        query: Option<String>,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nrecon:   parcours-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand = merge the default files in the current directory
        None => merge::cmd_merge(MergeArgs::default()),
        Some(Commands::Merge(args)) => merge::cmd_merge(args),
        Some(Commands::Validate { config }) => merge::cmd_validate(config),
        Some(Commands::Search(args)) => search::cmd_search(args),
        Some(Commands::Find { merged, query, json }) => {
            if query.trim().is_empty() {
                Err(CliError::usage("query must not be empty").with_hint("pass part of an establishment name"))
            } else {
                search::cmd_find(merged, query, json)
            }
        }
        Some(Commands::Suggest { merged, field, query }) => search::cmd_suggest(merged, field, query),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
