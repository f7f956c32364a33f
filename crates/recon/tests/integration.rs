use std::path::PathBuf;

use parcours_recon::config::MergeConfig;
use parcours_recon::engine::run;
use parcours_recon::model::{MergeOutcome, MergedRecord};
use parcours_recon::output::{load_merged, write_outcome};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_and_run() -> MergeOutcome {
    let config = MergeConfig::load(&fixtures_dir().join("merge.toml")).unwrap();
    run(&config).unwrap()
}

fn by_program<'a>(outcome: &'a MergeOutcome, program: &str) -> &'a MergedRecord {
    outcome
        .merged
        .iter()
        .find(|m| m.program == program)
        .unwrap_or_else(|| panic!("no merged record for program {program}"))
}

// -------------------------------------------------------------------------
// Merge
// -------------------------------------------------------------------------

#[test]
fn fixture_summary() {
    let outcome = load_and_run();
    let s = &outcome.summary;
    assert_eq!(s.primary_rows, 5);
    assert_eq!(s.supplementary_rows, 4);
    assert_eq!(s.merged, 5);
    assert_eq!(s.with_detailed_info, 3);
    assert_eq!(s.without_detailed_info, 2);
    assert_eq!(s.unmatched, 1);
    assert_eq!(s.duplicate_keys, 1);
    assert_eq!(s.unparseable_numbers, 3);
}

#[test]
fn merged_follows_primary_order() {
    let outcome = load_and_run();
    let names: Vec<&str> = outcome
        .merged
        .iter()
        .map(|m| m.establishment_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "HEC Paris",
            "Université Paris Cité",
            "École Polytechnique",
            "Lycée Henri IV",
            "Université Paris Cité",
        ]
    );
}

#[test]
fn hyphenated_lowercase_name_matches() {
    let outcome = load_and_run();
    let hec = by_program(&outcome, "Classe préparatoire - ECG");
    assert!(hec.has_detailed_info);
    assert_eq!(hec.candidate_count, 100);
    assert_eq!(hec.admitted_bac_general, 10);
    assert_eq!(hec.general_terminal_offer_percentage, "92");
    let details = hec.details.as_ref().unwrap();
    assert_eq!(details.cost, "15000€");
    assert_eq!(details.associations, "BDE, BDS, Junior");
    assert_eq!(details.website, "https://www.hec.edu");
}

#[test]
fn later_duplicate_details_win() {
    let outcome = load_and_run();
    for program in ["Licence - Psychologie", "Licence - Chimie"] {
        let record = by_program(&outcome, program);
        assert!(record.has_detailed_info);
        assert_eq!(record.details.as_ref().unwrap().cost, "178€");
    }
}

#[test]
fn corrupt_and_ragged_rows_degrade() {
    let outcome = load_and_run();

    let polytechnique = by_program(&outcome, "Cycle pluridisciplinaire");
    assert_eq!(polytechnique.candidate_count, 0);
    assert_eq!(polytechnique.admitted_bac_general, 12);
    assert!(!polytechnique.has_detailed_info);
    assert!(polytechnique.details.is_none());

    let henri_iv = by_program(&outcome, "CPGE - MPSI");
    assert_eq!(henri_iv.candidate_count, 2380);
    assert_eq!(henri_iv.admitted_bac_techno, 0);
    assert_eq!(henri_iv.admitted_bac_pro, 0);
    assert_eq!(henri_iv.professional_terminal_offer_percentage, "");
}

#[test]
fn unmatched_lists_original_spelling() {
    let outcome = load_and_run();
    assert_eq!(outcome.unmatched, vec!["Institut Imaginaire".to_string()]);
    assert!(outcome
        .merged
        .iter()
        .filter_map(|m| m.details.as_ref())
        .all(|d| d.cost != "9000€"));
}

#[test]
fn has_detailed_info_iff_key_present() {
    use parcours_recon::normalize;

    let outcome = load_and_run();
    let school_keys = [
        normalize("hec-paris"),
        normalize("UNIVERSITE PARIS CITE"),
        normalize("Institut Imaginaire"),
    ];
    for m in &outcome.merged {
        let key = normalize(&m.establishment_name);
        assert_eq!(m.has_detailed_info, school_keys.contains(&key), "{}", m.establishment_name);
        assert_eq!(m.has_detailed_info, m.details.is_some());
    }
}

// -------------------------------------------------------------------------
// Output artifacts
// -------------------------------------------------------------------------

#[test]
fn written_artifacts_match_contract() {
    let outcome = load_and_run();
    let dir = tempfile::tempdir().unwrap();
    let merged_path = dir.path().join("merged_formations.json");
    let unmatched_path = dir.path().join("unmatched_ecoles.json");
    write_outcome(&outcome, &merged_path, &unmatched_path).unwrap();

    let merged: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&merged_path).unwrap()).unwrap();
    let rows = merged.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["establishmentName"], "HEC Paris");
    assert_eq!(rows[0]["candidateCount"], 100);
    assert_eq!(rows[0]["cost"], "15000€");
    assert_eq!(rows[0]["hasDetailedInfo"], true);
    assert_eq!(rows[2]["hasDetailedInfo"], false);
    assert!(rows[2].get("cost").is_none());
    assert!(rows[2].get("careerProspects").is_none());

    let unmatched: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&unmatched_path).unwrap()).unwrap();
    assert_eq!(unmatched, vec!["Institut Imaginaire"]);

    let reloaded = load_merged(&merged_path).unwrap();
    assert_eq!(reloaded, outcome.merged);
}

#[test]
fn semicolon_sources_via_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("p.csv"),
        "Établissement;Effectif total des candidats pour une formation\nHEC Paris;7\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("s.csv"), "Établissement;Coût\nHEC  PARIS;1€\n").unwrap();
    std::fs::write(
        dir.path().join("merge.toml"),
        "[sources]\nprimary = \"p.csv\"\nsupplementary = \"s.csv\"\ndelimiter = \";\"\n",
    )
    .unwrap();

    let config = MergeConfig::load(&dir.path().join("merge.toml")).unwrap();
    let outcome = run(&config).unwrap();
    assert_eq!(outcome.merged[0].candidate_count, 7);
    assert_eq!(outcome.merged[0].details.as_ref().unwrap().cost, "1€");
}
