use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
}

// ---------------------------------------------------------------------------
// Sources + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    #[serde(default = "default_primary")]
    pub primary: PathBuf,
    #[serde(default = "default_supplementary")]
    pub supplementary: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            supplementary: default_supplementary(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_primary() -> PathBuf {
    PathBuf::from("fichier_filtre.csv")
}

fn default_supplementary() -> PathBuf {
    PathBuf::from("ecoles.csv")
}

fn default_delimiter() -> char {
    ','
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_merged")]
    pub merged: PathBuf,
    #[serde(default = "default_unmatched")]
    pub unmatched: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            merged: default_merged(),
            unmatched: default_unmatched(),
        }
    }
}

fn default_merged() -> PathBuf {
    PathBuf::from("merged_formations.json")
}

fn default_unmatched() -> PathBuf {
    PathBuf::from("unmatched_ecoles.json")
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

const ESTABLISHMENT: &str = "Établissement";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub primary: PrimaryColumns,
    #[serde(default)]
    pub supplementary: SupplementaryColumns,
}

/// Header names in the enrollment dataset. Defaults are the published
/// Parcoursup export headers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimaryColumns {
    pub establishment_name: String,
    pub establishment_status: String,
    pub department: String,
    pub region: String,
    pub academy: String,
    pub commune: String,
    pub program: String,
    pub selectivity: String,
    pub candidate_count: String,
    pub admitted_bac_general: String,
    pub admitted_bac_techno: String,
    pub admitted_bac_pro: String,
    pub general_terminal_offer_percentage: String,
    pub techno_terminal_offer_percentage: String,
    pub professional_terminal_offer_percentage: String,
}

impl Default for PrimaryColumns {
    fn default() -> Self {
        Self {
            establishment_name: ESTABLISHMENT.into(),
            establishment_status:
                "Statut de l'établissement de la filière de formation (public, privé…)".into(),
            department: "Département de l'établissement".into(),
            region: "Région de l'établissement".into(),
            academy: "Académie de l'établissement".into(),
            commune: "Commune de l'établissement".into(),
            program: "Filière de formation".into(),
            selectivity: "Sélectivité".into(),
            candidate_count: "Effectif total des candidats pour une formation".into(),
            admitted_bac_general: "Effectif des admis néo bacheliers généraux".into(),
            admitted_bac_techno: "Effectif des admis néo bacheliers technologiques".into(),
            admitted_bac_pro: "Effectif des admis néo bacheliers professionnels".into(),
            general_terminal_offer_percentage: "Part des terminales générales qui étaient en position de recevoir une proposition en phase principale".into(),
            techno_terminal_offer_percentage: "Part des terminales technologiques qui étaient en position de recevoir une proposition en phase principale".into(),
            professional_terminal_offer_percentage: "Part des terminales professionnelles qui étaient en position de recevoir une proposition en phase principale".into(),
        }
    }
}

impl PrimaryColumns {
    fn all(&self) -> [(&'static str, &str); 15] {
        [
            ("establishment_name", &self.establishment_name),
            ("establishment_status", &self.establishment_status),
            ("department", &self.department),
            ("region", &self.region),
            ("academy", &self.academy),
            ("commune", &self.commune),
            ("program", &self.program),
            ("selectivity", &self.selectivity),
            ("candidate_count", &self.candidate_count),
            ("admitted_bac_general", &self.admitted_bac_general),
            ("admitted_bac_techno", &self.admitted_bac_techno),
            ("admitted_bac_pro", &self.admitted_bac_pro),
            ("general_terminal_offer_percentage", &self.general_terminal_offer_percentage),
            ("techno_terminal_offer_percentage", &self.techno_terminal_offer_percentage),
            (
                "professional_terminal_offer_percentage",
                &self.professional_terminal_offer_percentage,
            ),
        ]
    }
}

/// Header names in the establishment-details dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupplementaryColumns {
    pub establishment_name: String,
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

impl Default for SupplementaryColumns {
    fn default() -> Self {
        Self {
            establishment_name: ESTABLISHMENT.into(),
            duration: "Durée".into(),
            cost: "Coût".into(),
            private_public_status: "Privé/Public".into(),
            domains_offered: "Domaines enseignés".into(),
            website: "Site web".into(),
            student_life: "Vie étudiante".into(),
            associations: "Associations (types)".into(),
            residence_options: "Résidence universitaire/internat".into(),
            admission_process: "Admission".into(),
            atmosphere: "Ambiance".into(),
            career_prospects: "Débouchés".into(),
            housing_info: "Logement".into(),
            alternance_available: "Alternance dispo".into(),
            orientation_advice: "Conseil orientation/charge".into(),
        }
    }
}

impl SupplementaryColumns {
    fn all(&self) -> [(&'static str, &str); 15] {
        [
            ("establishment_name", &self.establishment_name),
            ("duration", &self.duration),
            ("cost", &self.cost),
            ("private_public_status", &self.private_public_status),
            ("domains_offered", &self.domains_offered),
            ("website", &self.website),
            ("student_life", &self.student_life),
            ("associations", &self.associations),
            ("residence_options", &self.residence_options),
            ("admission_process", &self.admission_process),
            ("atmosphere", &self.atmosphere),
            ("career_prospects", &self.career_prospects),
            ("housing_info", &self.housing_info),
            ("alternance_available", &self.alternance_available),
            ("orientation_advice", &self.orientation_advice),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file and resolve its relative paths against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path).map_err(|source| {
            ReconError::SourceUnavailable { path: path.to_path_buf(), source }
        })?;
        let mut config = Self::from_toml(&input)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.sources.primary,
            &mut self.sources.supplementary,
            &mut self.output.merged,
            &mut self.output.unmatched,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.sources.delimiter as u8
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let paths = [
            ("sources.primary", &self.sources.primary),
            ("sources.supplementary", &self.sources.supplementary),
            ("output.merged", &self.output.merged),
            ("output.unmatched", &self.output.unmatched),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{name} must not be empty")));
            }
        }

        let delimiter = self.sources.delimiter;
        if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
            return Err(ReconError::ConfigValidation(format!(
                "sources.delimiter must be a single ASCII character other than quote or newline, got {delimiter:?}"
            )));
        }

        if self.output.merged == self.output.unmatched {
            return Err(ReconError::ConfigValidation(
                "output.merged and output.unmatched must be different files".into(),
            ));
        }

        for (field, header) in self.columns.primary.all() {
            if header.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.primary.{field} must not be empty"
                )));
            }
        }
        for (field, header) in self.columns.supplementary.all() {
            if header.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.supplementary.{field} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
