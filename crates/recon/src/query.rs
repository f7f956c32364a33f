//! Read-only catalog queries over a merged dataset.
//!
//! These are the lookups the browsing app performs on the formation catalog:
//! filtered and sorted listings, a quick name search, and value suggestions for
//! filter inputs.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::MergedRecord;
use crate::normalize::fold_accents;

/// Maximum hits returned by [`search_by_name`].
pub const NAME_SEARCH_LIMIT: usize = 5;

/// Values returned by [`field_suggestions`] when the query is blank.
pub const BLANK_SUGGESTION_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Baccalaureate track, used to keep formations that admitted at least one
/// student of that track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacType {
    General,
    Techno,
    Pro,
}

impl BacType {
    fn admitted(self, record: &MergedRecord) -> i64 {
        match self {
            Self::General => record.admitted_bac_general,
            Self::Techno => record.admitted_bac_techno,
            Self::Pro => record.admitted_bac_pro,
        }
    }
}

impl FromStr for BacType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "techno" => Ok(Self::Techno),
            "pro" => Ok(Self::Pro),
            other => Err(format!("unknown bac type '{other}' (expected general, techno or pro)")),
        }
    }
}

/// Exact-match criteria. `None` or blank strings are ignored.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub region: Option<String>,
    pub department: Option<String>,
    pub establishment_status: Option<String>,
    pub program: Option<String>,
    pub bac_type: Option<BacType>,
    pub has_detailed_info: Option<bool>,
    pub alternance_available: Option<String>,
}

fn text_matches(wanted: &Option<String>, actual: &str) -> bool {
    match wanted.as_deref() {
        Some(w) if !w.trim().is_empty() => w == actual,
        _ => true,
    }
}

impl SearchFilter {
    pub fn matches(&self, record: &MergedRecord) -> bool {
        let alternance = record
            .details
            .as_ref()
            .map(|d| d.alternance_available.as_str());
        let alternance_ok = match self.alternance_available.as_deref() {
            Some(w) if !w.trim().is_empty() => alternance == Some(w),
            _ => true,
        };

        text_matches(&self.region, &record.region)
            && text_matches(&self.department, &record.department)
            && text_matches(&self.establishment_status, &record.establishment_status)
            && text_matches(&self.program, &record.program)
            && self.bac_type.map_or(true, |bac| bac.admitted(record) > 0)
            && self
                .has_detailed_info
                .map_or(true, |wanted| record.has_detailed_info == wanted)
            && alternance_ok
    }
}

// ---------------------------------------------------------------------------
// Sort + Paging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Dataset order.
    #[default]
    Input,
    CandidateCount,
    AdmittedBacGeneral,
    AdmittedBacTechno,
    AdmittedBacPro,
    AcceptanceRate,
    EstablishmentName,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "candidate_count" | "candidateCount" => Ok(Self::CandidateCount),
            "admitted_bac_general" | "admittedBacGeneral" => Ok(Self::AdmittedBacGeneral),
            "admitted_bac_techno" | "admittedBacTechno" => Ok(Self::AdmittedBacTechno),
            "admitted_bac_pro" | "admittedBacPro" => Ok(Self::AdmittedBacPro),
            "acceptance_rate" | "acceptanceRate" => Ok(Self::AcceptanceRate),
            "establishment_name" | "establishmentName" => Ok(Self::EstablishmentName),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Zero-based.
    pub page: usize,
    pub size: usize,
    pub sort: SortField,
    pub direction: Direction,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20, sort: SortField::Input, direction: Direction::Asc }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
    pub total_pages: usize,
}

fn compare(a: &MergedRecord, b: &MergedRecord, field: SortField) -> Ordering {
    match field {
        SortField::Input => Ordering::Equal,
        SortField::CandidateCount => a.candidate_count.cmp(&b.candidate_count),
        SortField::AdmittedBacGeneral => a.admitted_bac_general.cmp(&b.admitted_bac_general),
        SortField::AdmittedBacTechno => a.admitted_bac_techno.cmp(&b.admitted_bac_techno),
        SortField::AdmittedBacPro => a.admitted_bac_pro.cmp(&b.admitted_bac_pro),
        // Records without a rate sort before any rate.
        SortField::AcceptanceRate => {
            match (acceptance_rate(a), acceptance_rate(b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        SortField::EstablishmentName => fold_accents(&a.establishment_name.to_lowercase())
            .cmp(&fold_accents(&b.establishment_name.to_lowercase())),
    }
}

/// Filter, sort (stable) and cut one page out of `records`.
pub fn search<'a>(
    records: &'a [MergedRecord],
    filter: &SearchFilter,
    request: &PageRequest,
) -> Page<&'a MergedRecord> {
    let mut hits: Vec<&MergedRecord> = records.iter().filter(|r| filter.matches(r)).collect();

    if request.sort != SortField::Input {
        hits.sort_by(|a, b| {
            let ord = compare(a, b, request.sort);
            match request.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
    } else if request.direction == Direction::Desc {
        hits.reverse();
    }

    let total = hits.len();
    let size = request.size.max(1);
    let content = hits.into_iter().skip(request.page.saturating_mul(size)).take(size).collect();

    Page {
        content,
        page: request.page,
        size,
        total,
        total_pages: total.div_ceil(size),
    }
}

// ---------------------------------------------------------------------------
// Name search + Suggestions
// ---------------------------------------------------------------------------

/// First [`NAME_SEARCH_LIMIT`] records whose establishment name contains
/// `query`, ignoring case.
pub fn search_by_name<'a>(records: &'a [MergedRecord], query: &str) -> Vec<&'a MergedRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.establishment_name.to_lowercase().contains(&needle))
        .take(NAME_SEARCH_LIMIT)
        .collect()
}

/// Fields that can feed a suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestField {
    EstablishmentName,
    Region,
    Department,
    Academy,
    Commune,
    Program,
    EstablishmentStatus,
}

impl SuggestField {
    fn value(self, record: &MergedRecord) -> &str {
        match self {
            Self::EstablishmentName => &record.establishment_name,
            Self::Region => &record.region,
            Self::Department => &record.department,
            Self::Academy => &record.academy,
            Self::Commune => &record.commune,
            Self::Program => &record.program,
            Self::EstablishmentStatus => &record.establishment_status,
        }
    }
}

impl FromStr for SuggestField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "establishment_name" | "establishmentName" => Ok(Self::EstablishmentName),
            "region" => Ok(Self::Region),
            "department" => Ok(Self::Department),
            "academy" => Ok(Self::Academy),
            "commune" => Ok(Self::Commune),
            "program" => Ok(Self::Program),
            "establishment_status" | "establishmentStatus" => Ok(Self::EstablishmentStatus),
            other => Err(format!("unknown field '{other}'")),
        }
    }
}

impl fmt::Display for SuggestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EstablishmentName => write!(f, "establishment_name"),
            Self::Region => write!(f, "region"),
            Self::Department => write!(f, "department"),
            Self::Academy => write!(f, "academy"),
            Self::Commune => write!(f, "commune"),
            Self::Program => write!(f, "program"),
            Self::EstablishmentStatus => write!(f, "establishment_status"),
        }
    }
}

/// Distinct non-empty values of `field` in first-seen order.
///
/// A blank query yields the first [`BLANK_SUGGESTION_LIMIT`] values; otherwise
/// every value starting with the query, compared without case or accents.
pub fn field_suggestions(records: &[MergedRecord], field: SuggestField, query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let distinct = records
        .iter()
        .map(|r| field.value(r))
        .filter(|v| !v.is_empty())
        .filter(move |v| seen.insert(*v));

    if query.trim().is_empty() {
        return distinct.take(BLANK_SUGGESTION_LIMIT).map(str::to_string).collect();
    }

    let prefix = fold_accents(&query.to_lowercase());
    distinct
        .filter(|v| fold_accents(&v.to_lowercase()).starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

/// Share of candidates admitted across the three bac tracks.
/// `None` when there were no candidates.
pub fn acceptance_rate(record: &MergedRecord) -> Option<f64> {
    if record.candidate_count == 0 {
        return None;
    }
    Some(record.total_admitted() as f64 / record.candidate_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Enrichment;

    fn rec(name: &str, region: &str, candidates: i64, general: i64, pro: i64) -> MergedRecord {
        MergedRecord {
            establishment_status: "Public".into(),
            establishment_name: name.into(),
            department: "Paris".into(),
            region: region.into(),
            academy: "Paris".into(),
            commune: "Paris".into(),
            program: "Licence".into(),
            selectivity: "formation non sélective".into(),
            candidate_count: candidates,
            admitted_bac_general: general,
            admitted_bac_techno: 0,
            admitted_bac_pro: pro,
            general_terminal_offer_percentage: String::new(),
            techno_terminal_offer_percentage: String::new(),
            professional_terminal_offer_percentage: String::new(),
            has_detailed_info: false,
            details: None,
        }
    }

    fn detailed(mut r: MergedRecord, alternance: &str) -> MergedRecord {
        r.has_detailed_info = true;
        r.details = Some(Enrichment { alternance_available: alternance.into(), ..Default::default() });
        r
    }

    fn catalog() -> Vec<MergedRecord> {
        vec![
            rec("Université Lyon 2", "Auvergne-Rhône-Alpes", 200, 50, 0),
            detailed(rec("École Centrale", "Île-de-France", 100, 10, 2), "Oui"),
            rec("Sorbonne Université", "Île-de-France", 0, 0, 0),
            detailed(rec("ECE Paris", "Île-de-France", 50, 25, 0), "Non"),
        ]
    }

    #[test]
    fn filter_by_region_and_bac_type() {
        let records = catalog();
        let filter = SearchFilter {
            region: Some("Île-de-France".into()),
            bac_type: Some(BacType::General),
            ..Default::default()
        };
        let page = search(&records, &filter, &PageRequest::default());
        let names: Vec<&str> = page.content.iter().map(|r| r.establishment_name.as_str()).collect();
        assert_eq!(names, vec!["École Centrale", "ECE Paris"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let records = catalog();
        let filter = SearchFilter { region: Some("  ".into()), ..Default::default() };
        assert_eq!(search(&records, &filter, &PageRequest::default()).total, 4);
    }

    #[test]
    fn detailed_and_alternance_filters() {
        let records = catalog();
        let filter = SearchFilter { has_detailed_info: Some(false), ..Default::default() };
        assert_eq!(search(&records, &filter, &PageRequest::default()).total, 2);

        let filter = SearchFilter { alternance_available: Some("Oui".into()), ..Default::default() };
        let page = search(&records, &filter, &PageRequest::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.content[0].establishment_name, "École Centrale");
    }

    #[test]
    fn sort_desc_by_candidates_and_page() {
        let records = catalog();
        let request = PageRequest {
            page: 1,
            size: 2,
            sort: SortField::CandidateCount,
            direction: Direction::Desc,
        };
        let page = search(&records, &SearchFilter::default(), &request);
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 2);
        let names: Vec<&str> = page.content.iter().map(|r| r.establishment_name.as_str()).collect();
        assert_eq!(names, vec!["ECE Paris", "Sorbonne Université"]);
    }

    #[test]
    fn sort_by_acceptance_rate_puts_missing_first() {
        let records = catalog();
        let request = PageRequest { sort: SortField::AcceptanceRate, ..Default::default() };
        let page = search(&records, &SearchFilter::default(), &request);
        let names: Vec<&str> = page.content.iter().map(|r| r.establishment_name.as_str()).collect();
        // None, 0.12, 0.25, 0.5
        assert_eq!(names, vec!["Sorbonne Université", "École Centrale", "Université Lyon 2", "ECE Paris"]);
    }

    #[test]
    fn sort_by_name_ignores_accents() {
        let records = catalog();
        let request = PageRequest { sort: SortField::EstablishmentName, ..Default::default() };
        let page = search(&records, &SearchFilter::default(), &request);
        let names: Vec<&str> = page.content.iter().map(|r| r.establishment_name.as_str()).collect();
        assert_eq!(names, vec!["ECE Paris", "École Centrale", "Sorbonne Université", "Université Lyon 2"]);
    }

    #[test]
    fn page_past_end_is_empty() {
        let records = catalog();
        let request = PageRequest { page: 9, size: 3, ..Default::default() };
        let page = search(&records, &SearchFilter::default(), &request);
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn name_search_is_case_insensitive_and_capped() {
        let records: Vec<MergedRecord> =
            (0..8).map(|i| rec(&format!("Lycée {i}"), "R", 1, 1, 0)).collect();
        assert_eq!(search_by_name(&records, "LYCÉE").len(), NAME_SEARCH_LIMIT);
        assert_eq!(search_by_name(&catalog(), "paris")[0].establishment_name, "ECE Paris");
        assert!(search_by_name(&catalog(), "zzz").is_empty());
    }

    #[test]
    fn suggestions_prefix_without_accents() {
        let records = catalog();
        assert_eq!(
            field_suggestions(&records, SuggestField::Region, "ile"),
            vec!["Île-de-France".to_string()]
        );
        assert_eq!(
            field_suggestions(&records, SuggestField::EstablishmentName, "ec"),
            vec!["École Centrale".to_string(), "ECE Paris".to_string()]
        );
    }

    #[test]
    fn blank_suggestions_are_distinct_and_capped() {
        let records: Vec<MergedRecord> = (0..10)
            .map(|i| rec("X", &format!("Region {}", i % 7), 1, 1, 0))
            .collect();
        let values = field_suggestions(&records, SuggestField::Region, "");
        assert_eq!(values, vec!["Region 0", "Region 1", "Region 2", "Region 3", "Region 4"]);
    }

    #[test]
    fn acceptance_rate_sums_tracks() {
        let r = rec("X", "R", 100, 10, 2);
        assert_eq!(acceptance_rate(&r), Some(0.12));
        assert_eq!(acceptance_rate(&rec("X", "R", 0, 5, 0)), None);
    }

    #[test]
    fn acceptance_rate_survives_extreme_counts() {
        let mut r = rec("X", "R", 10, i64::MAX, 0);
        r.admitted_bac_techno = 1;
        assert_eq!(r.total_admitted(), i64::MAX);
        let rate = acceptance_rate(&r).unwrap();
        assert!(rate > 0.0);

        let records = vec![r, rec("Y", "R", 10, 5, 0)];
        let request = PageRequest { sort: SortField::AcceptanceRate, ..Default::default() };
        let page = search(&records, &SearchFilter::default(), &request);
        assert_eq!(page.content[0].establishment_name, "Y");
    }

    #[test]
    fn parse_enums() {
        assert_eq!("techno".parse::<BacType>(), Ok(BacType::Techno));
        assert!("bac+5".parse::<BacType>().is_err());
        assert_eq!("candidateCount".parse::<SortField>(), Ok(SortField::CandidateCount));
        assert_eq!("region".parse::<SuggestField>(), Ok(SuggestField::Region));
    }
}
