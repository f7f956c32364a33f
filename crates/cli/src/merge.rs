//! `parcours merge`: join the enrollment dataset with establishment details.

use std::path::{Path, PathBuf};

use clap::Args;
use parcours_recon::output::write_outcome;
use parcours_recon::MergeConfig;

use crate::exit_codes::{recon_exit_code, EXIT_ERROR};
use crate::CliError;

#[derive(Args, Debug, Default)]
pub struct MergeArgs {
    /// Merge config (TOML). Relative paths inside it resolve against its directory
    #[arg(long, short = 'c', env = "PARCOURS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enrollment CSV, one row per establishment and program
    #[arg(long)]
    pub primary: Option<PathBuf>,

    /// Establishment-details CSV, one row per establishment
    #[arg(long)]
    pub supplementary: Option<PathBuf>,

    /// Where to write the merged JSON array
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Where to write the JSON array of unmatched establishment names
    #[arg(long)]
    pub unmatched: Option<PathBuf>,

    /// Field delimiter of both CSV files
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Print run metadata and summary as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

fn engine_err(err: parcours_recon::ReconError) -> CliError {
    let code = recon_exit_code(&err);
    let hint = match &err {
        parcours_recon::ReconError::SourceUnavailable { .. } => {
            Some("pass --primary/--supplementary or a --config file".to_string())
        }
        _ => None,
    };
    CliError { code, message: err.to_string(), hint }
}

/// Config file (or built-in defaults) with command-line overrides applied.
pub(crate) fn resolve_config(args: &MergeArgs) -> Result<MergeConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path).map_err(engine_err)?,
        None => MergeConfig::default(),
    };

    if let Some(ref p) = args.primary {
        config.sources.primary = p.clone();
    }
    if let Some(ref p) = args.supplementary {
        config.sources.supplementary = p.clone();
    }
    if let Some(ref p) = args.output {
        config.output.merged = p.clone();
    }
    if let Some(ref p) = args.unmatched {
        config.output.unmatched = p.clone();
    }
    if let Some(d) = args.delimiter {
        config.sources.delimiter = d;
    }

    config.validate().map_err(engine_err)?;
    Ok(config)
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    log::debug!("merge config: {config:?}");

    eprintln!(
        "reading {} and {}",
        config.sources.primary.display(),
        config.sources.supplementary.display()
    );

    let outcome = parcours_recon::run(&config).map_err(engine_err)?;

    let s = &outcome.summary;
    eprintln!("read {} records from {}", s.primary_rows, config.sources.primary.display());
    eprintln!(
        "read {} records from {}",
        s.supplementary_rows,
        config.sources.supplementary.display()
    );

    // Only written once the whole merge is in memory.
    write_outcome(&outcome, &config.output.merged, &config.output.unmatched)
        .map_err(engine_err)?;

    if !outcome.unmatched.is_empty() {
        eprintln!(
            "{} establishment(s) from {} could not be matched:",
            outcome.unmatched.len(),
            display_name(&config.sources.supplementary)
        );
        for name in &outcome.unmatched {
            eprintln!("- {name}");
        }
    }

    eprintln!(
        "merged {} formations ({} with details, {} without), {} unmatched establishments",
        s.merged, s.with_detailed_info, s.without_detailed_info, s.unmatched,
    );
    eprintln!("wrote {}", config.output.merged.display());
    eprintln!("wrote {}", config.output.unmatched.display());

    if args.json {
        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json}");
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = MergeConfig::load(&config_path).map_err(engine_err)?;
    eprintln!(
        "{}: ok (primary {}, supplementary {}, delimiter {:?})",
        config_path.display(),
        config.sources.primary.display(),
        config.sources.supplementary.display(),
        config.sources.delimiter,
    );
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
