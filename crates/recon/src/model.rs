use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{PrimaryColumns, SupplementaryColumns};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One CSV row keyed by header. Ragged rows keep whatever fields they have.
pub type RawRecord = HashMap<String, String>;

fn field(raw: &RawRecord, column: &str) -> String {
    raw.get(column).cloned().unwrap_or_default()
}

/// A (establishment, program) row from the enrollment dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryRecord {
    pub establishment_status: String,
    pub establishment_name: String,
    pub department: String,
    pub region: String,
    pub academy: String,
    pub commune: String,
    pub program: String,
    pub selectivity: String,
    pub candidate_count: i64,
    pub admitted_bac_general: i64,
    pub admitted_bac_techno: i64,
    pub admitted_bac_pro: i64,
    pub general_terminal_offer_percentage: String,
    pub techno_terminal_offer_percentage: String,
    pub professional_terminal_offer_percentage: String,
}

impl PrimaryRecord {
    /// Map a raw row through the configured headers. Missing columns become
    /// empty strings and unreadable counts become 0.
    pub fn from_raw(raw: &RawRecord, cols: &PrimaryColumns) -> Self {
        let count = |column: &str| parse_count(raw.get(column).map(String::as_str).unwrap_or(""));
        Self {
            establishment_status: field(raw, &cols.establishment_status),
            establishment_name: field(raw, &cols.establishment_name),
            department: field(raw, &cols.department),
            region: field(raw, &cols.region),
            academy: field(raw, &cols.academy),
            commune: field(raw, &cols.commune),
            program: field(raw, &cols.program),
            selectivity: field(raw, &cols.selectivity),
            candidate_count: count(&cols.candidate_count),
            admitted_bac_general: count(&cols.admitted_bac_general),
            admitted_bac_techno: count(&cols.admitted_bac_techno),
            admitted_bac_pro: count(&cols.admitted_bac_pro),
            general_terminal_offer_percentage: field(raw, &cols.general_terminal_offer_percentage),
            techno_terminal_offer_percentage: field(raw, &cols.techno_terminal_offer_percentage),
            professional_terminal_offer_percentage: field(
                raw,
                &cols.professional_terminal_offer_percentage,
            ),
        }
    }

    /// Number of count columns whose raw text did not start with an integer.
    pub fn unparseable_counts(raw: &RawRecord, cols: &PrimaryColumns) -> usize {
        [
            &cols.candidate_count,
            &cols.admitted_bac_general,
            &cols.admitted_bac_techno,
            &cols.admitted_bac_pro,
        ]
        .iter()
        .filter(|column| {
            raw.get(column.as_str())
                .map_or(true, |value| leading_integer(value).is_none())
        })
        .count()
    }
}

/// Narrative fields from the establishment dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub duration: String,
    pub cost: String,
    pub private_public_status: String,
    pub domains_offered: String,
    pub website: String,
    pub student_life: String,
    pub associations: String,
    pub residence_options: String,
    pub admission_process: String,
    pub atmosphere: String,
    pub career_prospects: String,
    pub housing_info: String,
    pub alternance_available: String,
    pub orientation_advice: String,
}

/// One establishment from the enrichment dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplementaryRecord {
    pub establishment_name: String,
    pub enrichment: Enrichment,
}

impl SupplementaryRecord {
    pub fn from_raw(raw: &RawRecord, cols: &SupplementaryColumns) -> Self {
        Self {
            establishment_name: field(raw, &cols.establishment_name),
            enrichment: Enrichment {
                duration: field(raw, &cols.duration),
                cost: field(raw, &cols.cost),
                private_public_status: field(raw, &cols.private_public_status),
                domains_offered: field(raw, &cols.domains_offered),
                website: field(raw, &cols.website),
                student_life: field(raw, &cols.student_life),
                associations: field(raw, &cols.associations),
                residence_options: field(raw, &cols.residence_options),
                admission_process: field(raw, &cols.admission_process),
                atmosphere: field(raw, &cols.atmosphere),
                career_prospects: field(raw, &cols.career_prospects),
                housing_info: field(raw, &cols.housing_info),
                alternance_available: field(raw, &cols.alternance_available),
                orientation_advice: field(raw, &cols.orientation_advice),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Count parsing
// ---------------------------------------------------------------------------

/// Leading integer of `raw`: optional whitespace, optional sign, digits.
/// Trailing text is ignored ("12 élèves" is 12).
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parse an admission statistic. Anything without a leading integer is 0.
pub fn parse_count(raw: &str) -> i64 {
    leading_integer(raw).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A primary row plus, when its establishment matched, the enrichment block.
///
/// Serialized as one flat camelCase object. Enrichment keys are left out
/// entirely when there was no match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRecord {
    pub establishment_status: String,
    pub establishment_name: String,
    pub department: String,
    pub region: String,
    pub academy: String,
    pub commune: String,
    pub program: String,
    pub selectivity: String,
    pub candidate_count: i64,
    pub admitted_bac_general: i64,
    pub admitted_bac_techno: i64,
    pub admitted_bac_pro: i64,
    pub general_terminal_offer_percentage: String,
    pub techno_terminal_offer_percentage: String,
    pub professional_terminal_offer_percentage: String,
    pub has_detailed_info: bool,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Enrichment>,
}

impl MergedRecord {
    pub fn new(primary: &PrimaryRecord, details: Option<&Enrichment>) -> Self {
        Self {
            establishment_status: primary.establishment_status.clone(),
            establishment_name: primary.establishment_name.clone(),
            department: primary.department.clone(),
            region: primary.region.clone(),
            academy: primary.academy.clone(),
            commune: primary.commune.clone(),
            program: primary.program.clone(),
            selectivity: primary.selectivity.clone(),
            candidate_count: primary.candidate_count,
            admitted_bac_general: primary.admitted_bac_general,
            admitted_bac_techno: primary.admitted_bac_techno,
            admitted_bac_pro: primary.admitted_bac_pro,
            general_terminal_offer_percentage: primary.general_terminal_offer_percentage.clone(),
            techno_terminal_offer_percentage: primary.techno_terminal_offer_percentage.clone(),
            professional_terminal_offer_percentage: primary
                .professional_terminal_offer_percentage
                .clone(),
            has_detailed_info: details.is_some(),
            details: details.cloned(),
        }
    }

    /// Admitted students across the three bac tracks. Saturates instead of
    /// overflowing on absurd counts.
    pub fn total_admitted(&self) -> i64 {
        self.admitted_bac_general
            .saturating_add(self.admitted_bac_techno)
            .saturating_add(self.admitted_bac_pro)
    }
}

/// Supplementary establishment names that matched no primary row, in input
/// order and original spelling.
pub type UnmatchedReport = Vec<String>;

/// Result of the pure reconciliation step.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub merged: Vec<MergedRecord>,
    pub unmatched: UnmatchedReport,
    /// Supplementary rows shadowed by a later row with the same key.
    pub duplicate_keys: usize,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeSummary {
    pub primary_rows: usize,
    pub supplementary_rows: usize,
    pub merged: usize,
    pub with_detailed_info: usize,
    pub without_detailed_info: usize,
    pub unmatched: usize,
    pub duplicate_keys: usize,
    pub unparseable_numbers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub engine_version: String,
    pub run_at: String,
    pub primary_source: String,
    pub supplementary_source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub meta: MergeMeta,
    pub summary: MergeSummary,
    #[serde(skip)]
    pub merged: Vec<MergedRecord>,
    #[serde(skip)]
    pub unmatched: UnmatchedReport,
}
