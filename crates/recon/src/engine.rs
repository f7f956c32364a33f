use std::collections::HashMap;

use crate::config::MergeConfig;
use crate::error::ReconError;
use crate::loader::load_records;
use crate::model::{
    MergeMeta, MergeOutcome, MergeSummary, MergedRecord, PrimaryRecord, RawRecord,
    Reconciliation, SupplementaryRecord,
};
use crate::normalize::{normalize, NormalizedKey};

/// Load both sources per config, then reconcile. Nothing is written.
pub fn run(config: &MergeConfig) -> Result<MergeOutcome, ReconError> {
    let delimiter = config.delimiter_byte();

    // Both sources are fully read before matching starts.
    let primary_raw = load_records(&config.sources.primary, delimiter)?;
    let supplementary_raw = load_records(&config.sources.supplementary, delimiter)?;

    let primary_cols = &config.columns.primary;
    let unparseable_numbers: usize = primary_raw
        .iter()
        .map(|raw| PrimaryRecord::unparseable_counts(raw, primary_cols))
        .sum();
    if unparseable_numbers > 0 {
        log::debug!("{unparseable_numbers} count field(s) were blank or not numeric, read as 0");
    }

    let primary = to_primary(&primary_raw, config);
    let supplementary = to_supplementary(&supplementary_raw, config);

    let reconciliation = reconcile(&primary, &supplementary);
    let mut summary = compute_summary(&reconciliation, primary.len(), supplementary.len());
    summary.unparseable_numbers = unparseable_numbers;

    Ok(MergeOutcome {
        meta: MergeMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            primary_source: config.sources.primary.display().to_string(),
            supplementary_source: config.sources.supplementary.display().to_string(),
        },
        summary,
        merged: reconciliation.merged,
        unmatched: reconciliation.unmatched,
    })
}

fn to_primary(rows: &[RawRecord], config: &MergeConfig) -> Vec<PrimaryRecord> {
    rows.iter()
        .map(|raw| PrimaryRecord::from_raw(raw, &config.columns.primary))
        .collect()
}

fn to_supplementary(rows: &[RawRecord], config: &MergeConfig) -> Vec<SupplementaryRecord> {
    rows.iter()
        .map(|raw| SupplementaryRecord::from_raw(raw, &config.columns.supplementary))
        .collect()
}

/// Key → supplementary record. A later record with the same key replaces an
/// earlier one. Returns the index and how many records were replaced.
pub fn build_index(
    supplementary: &[SupplementaryRecord],
) -> (HashMap<NormalizedKey, &SupplementaryRecord>, usize) {
    let mut index = HashMap::with_capacity(supplementary.len());
    let mut replaced = 0;
    for record in supplementary {
        let key = normalize(&record.establishment_name);
        if let Some(previous) = index.insert(key, record) {
            replaced += 1;
            log::warn!(
                "duplicate establishment key: '{}' replaces '{}'",
                record.establishment_name,
                previous.establishment_name
            );
        }
    }
    (index, replaced)
}

/// Merge every primary record with its establishment details, if any, and list
/// the supplementary establishments no primary record refers to.
///
/// `merged` follows primary order one-to-one; `unmatched` follows
/// supplementary order.
pub fn reconcile(
    primary: &[PrimaryRecord],
    supplementary: &[SupplementaryRecord],
) -> Reconciliation {
    let (index, duplicate_keys) = build_index(supplementary);

    let merged = primary
        .iter()
        .map(|p| {
            let details = index
                .get(&normalize(&p.establishment_name))
                .map(|s| &s.enrichment);
            MergedRecord::new(p, details)
        })
        .collect();

    let unmatched = find_unmatched(primary, supplementary);
    for name in &unmatched {
        log::info!("no formation for establishment: {name}");
    }

    Reconciliation {
        merged,
        unmatched,
        duplicate_keys,
    }
}

/// Supplementary names whose key equals no primary key.
///
/// Scans the primary records for each supplementary record rather than going
/// through the index, so every supplementary row is judged on its own, even
/// one shadowed in the index by a later duplicate.
pub fn find_unmatched(
    primary: &[PrimaryRecord],
    supplementary: &[SupplementaryRecord],
) -> Vec<String> {
    let primary_keys: Vec<NormalizedKey> = primary
        .iter()
        .map(|p| normalize(&p.establishment_name))
        .collect();

    supplementary
        .iter()
        .filter(|s| {
            let key = normalize(&s.establishment_name);
            !primary_keys.iter().any(|k| *k == key)
        })
        .map(|s| s.establishment_name.clone())
        .collect()
}

pub fn compute_summary(
    reconciliation: &Reconciliation,
    primary_rows: usize,
    supplementary_rows: usize,
) -> MergeSummary {
    let with_detailed_info = reconciliation
        .merged
        .iter()
        .filter(|m| m.has_detailed_info)
        .count();
    MergeSummary {
        primary_rows,
        supplementary_rows,
        merged: reconciliation.merged.len(),
        with_detailed_info,
        without_detailed_info: reconciliation.merged.len() - with_detailed_info,
        unmatched: reconciliation.unmatched.len(),
        duplicate_keys: reconciliation.duplicate_keys,
        unparseable_numbers: 0,
    }
}
