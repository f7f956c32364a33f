//! `parcours search|find|suggest`: read-only queries over a merged dataset.

use std::path::{Path, PathBuf};

use clap::Args;
use parcours_recon::model::MergedRecord;
use parcours_recon::output::load_merged;
use parcours_recon::query::{
    acceptance_rate, field_suggestions, search, search_by_name, BacType, Direction, PageRequest,
    SearchFilter, SortField, SuggestField,
};

use crate::exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_USAGE};
use crate::util::render_table;
use crate::CliError;

const COLUMN_WIDTH: usize = 40;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Merged dataset written by `parcours merge`
    pub merged: PathBuf,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    /// Establishment status, e.g. "Public"
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub program: Option<String>,

    /// Keep formations that admitted this track: general, techno or pro
    #[arg(long, value_parser = parse_with::<BacType>)]
    pub bac: Option<BacType>,

    /// Keep only formations with (true) or without (false) establishment details
    #[arg(long)]
    pub detailed: Option<bool>,

    /// Apprenticeship availability, as spelled in the details dataset
    #[arg(long)]
    pub alternance: Option<String>,

    /// candidate_count, admitted_bac_general, admitted_bac_techno,
    /// admitted_bac_pro, acceptance_rate, establishment_name or input
    #[arg(long, default_value = "input", value_parser = parse_with::<SortField>)]
    pub sort: SortField,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    #[arg(long, default_value_t = 20)]
    pub size: usize,

    /// Print the page as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

fn parse_with<T: std::str::FromStr<Err = String>>(s: &str) -> Result<T, String> {
    s.parse()
}

fn load(path: &Path) -> Result<Vec<MergedRecord>, CliError> {
    load_merged(path).map_err(|e| CliError {
        code: recon_exit_code(&e),
        message: e.to_string(),
        hint: Some("run `parcours merge` first".to_string()),
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;
    println!("{json}");
    Ok(())
}

fn table_rows(records: &[&MergedRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.establishment_name.clone(),
                r.program.clone(),
                r.region.clone(),
                r.candidate_count.to_string(),
                acceptance_rate(r)
                    .map(|rate| format!("{:.1}%", rate * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
                if r.has_detailed_info { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect()
}

const TABLE_HEADERS: [&str; 6] = ["establishment", "program", "region", "candidates", "rate", "details"];

pub fn cmd_search(args: SearchArgs) -> Result<(), CliError> {
    if args.size == 0 {
        return Err(CliError { code: EXIT_USAGE, message: "--size must be at least 1".into(), hint: None });
    }
    let records = load(&args.merged)?;

    let filter = SearchFilter {
        region: args.region,
        department: args.department,
        establishment_status: args.status,
        program: args.program,
        bac_type: args.bac,
        has_detailed_info: args.detailed,
        alternance_available: args.alternance,
    };
    let request = PageRequest {
        page: args.page,
        size: args.size,
        sort: args.sort,
        direction: if args.desc { Direction::Desc } else { Direction::Asc },
    };

    let page = search(&records, &filter, &request);
    log::debug!("search matched {} of {} records", page.total, records.len());

    if args.json {
        return print_json(&page);
    }

    print!("{}", render_table(&TABLE_HEADERS, &table_rows(&page.content), COLUMN_WIDTH));
    eprintln!(
        "page {}/{} ({} matching formations)",
        page.page + 1,
        page.total_pages.max(1),
        page.total
    );
    Ok(())
}

pub fn cmd_find(merged: PathBuf, query: String, json: bool) -> Result<(), CliError> {
    let records = load(&merged)?;
    let hits = search_by_name(&records, &query);
    if json {
        return print_json(&hits);
    }
    print!("{}", render_table(&TABLE_HEADERS, &table_rows(&hits), COLUMN_WIDTH));
    Ok(())
}

pub fn cmd_suggest(merged: PathBuf, field: String, query: Option<String>) -> Result<(), CliError> {
    let field: SuggestField = field.parse().map_err(|message| CliError {
        code: EXIT_USAGE,
        message,
        hint: Some(
            "fields: establishment_name, region, department, academy, commune, program, establishment_status"
                .to_string(),
        ),
    })?;
    let records = load(&merged)?;
    let values = field_suggestions(&records, field, query.as_deref().unwrap_or(""));
    log::debug!("{} suggestion(s) for {field}", values.len());
    for value in values {
        println!("{value}");
    }
    Ok(())
}
