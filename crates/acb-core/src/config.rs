//! Pipeline configuration.
//!
//! Every field has a default matching the study's file layout, so an empty
//! TOML file (or no file at all) describes a complete run. Paths in
//! [`InputFiles`] are relative to `data_dir`.
//!
//! Dates are written as quoted strings (`"1901-01-01"`).

use std::path::{Path, PathBuf};

use acb_common::ISO_DATE_FORMAT;
use acb_ingest::CsvOptions;
use acb_model::Granularity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::censor::AbsentWindowPolicy;
use crate::covariates::Derivation;
use crate::error::{PanelError, Result};
use crate::resolver::MissingVisitPolicy;

/// Placeholder dates the prescription extracts use for unknown issue dates.
pub const DEFAULT_PLACEHOLDER_DATES: [&str; 4] =
    ["1901-01-01", "1902-02-02", "1903-03-03", "2037-07-07"];

pub const DEFAULT_DEATH_COLUMN: &str = "X40000.0.0";

const MONTH_COLUMNS: [&str; 19] = [
    "aa_meta",
    "aa_0",
    "aa_1",
    "aa_2",
    "aa_3",
    "aa_1_value",
    "aa_2_value",
    "aa_3_value",
    "class_acid_disorder",
    "class_analgesic",
    "class_antidepressant",
    "class_antithrombotic",
    "class_cardiovascular",
    "class_other",
    "class_diabetes",
    "class_gastrointestinal",
    "class_psycholeptic",
    "class_respiratory",
    "class_urological",
];

const SCALE_COLUMNS: [&str; 11] = [
    "aa_ancelin",
    "aa_boustani",
    "aa_carnahan",
    "aa_cancelli",
    "aa_chew",
    "aa_rudolph",
    "aa_ehrt",
    "aa_han",
    "aa_sittironnarit",
    "aa_duran",
    "aa_kiesel",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Field separator of the written panel tables.
    pub separator: char,
    pub inputs: InputFiles,
    pub aggregation: AggregationColumns,
    /// Event dates that mark an unknown date rather than a real one.
    pub placeholder_dates: Vec<NaiveDate>,
    /// Name of the death date column in the mortality table.
    pub death_column: String,
    pub missing_visit_policy: MissingVisitPolicy,
    pub absent_window_policy: AbsentWindowPolicy,
    /// Covariates joined onto the panel, in output column order.
    pub covariates: Vec<CovariateSource>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            separator: '|',
            inputs: InputFiles::default(),
            aggregation: AggregationColumns::default(),
            placeholder_dates: DEFAULT_PLACEHOLDER_DATES
                .iter()
                .filter_map(|raw| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT).ok())
                .collect(),
            death_column: DEFAULT_DEATH_COLUMN.to_string(),
            missing_visit_policy: MissingVisitPolicy::default(),
            absent_window_policy: AbsentWindowPolicy::default(),
            covariates: default_covariates(),
        }
    }
}

impl PipelineConfig {
    /// Load a config file. Missing fields take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PanelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| PanelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot describe a run.
    pub fn validate(&self) -> Result<()> {
        if !self.separator.is_ascii() {
            return Err(PanelError::InvalidConfig {
                message: format!("separator {:?} is not a single ASCII character", self.separator),
            });
        }
        for (granularity, columns) in [
            ("month", &self.aggregation.month),
            ("year", &self.aggregation.year),
        ] {
            if columns.is_empty() {
                return Err(PanelError::InvalidConfig {
                    message: format!("no {granularity} aggregation columns configured"),
                });
            }
        }
        let mut names: Vec<&str> = self.covariates.iter().filter_map(CovariateSource::name).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PanelError::InvalidConfig {
                message: format!("covariate '{}' configured twice", pair[0]),
            });
        }
        Ok(())
    }

    /// Absolute location of an input file.
    pub fn input_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// The aggregation columns of the given granularities, without repeats.
    pub fn event_columns(&self, granularities: &[Granularity]) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for granularity in granularities {
            for column in self.aggregation.columns(*granularity) {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        columns
    }
}

/// Input file names relative to `data_dir`, with the read options of the
/// two legacy extracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFiles {
    pub events: String,
    pub events_format: CsvOptions,
    pub demographics: String,
    pub visit_dates: String,
    /// Precomputed presence windows. When unset, windows are derived from
    /// the prescription log and the mortality table.
    pub presence: Option<String>,
    pub prescription_log: String,
    pub prescription_log_format: CsvOptions,
    /// `chrono` format of the prescription log dates.
    pub prescription_log_date_format: String,
    pub mortality: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            events: "meds_cleaned.csv".to_string(),
            events_format: CsvOptions::legacy(),
            demographics: "age_sex.csv".to_string(),
            visit_dates: "test_date.csv".to_string(),
            presence: None,
            prescription_log: "2_prescriptions_readv2.csv".to_string(),
            prescription_log_format: CsvOptions::legacy().with_delimiter('|'),
            prescription_log_date_format: "%d/%m/%Y".to_string(),
            mortality: "mortality.csv".to_string(),
        }
    }
}

/// Indicator columns summed per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationColumns {
    pub month: Vec<String>,
    pub year: Vec<String>,
}

impl AggregationColumns {
    pub fn columns(&self, granularity: Granularity) -> &[String] {
        match granularity {
            Granularity::Month => &self.month,
            Granularity::Year => &self.year,
        }
    }
}

impl Default for AggregationColumns {
    fn default() -> Self {
        let month: Vec<String> = MONTH_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        let year = month
            .iter()
            .cloned()
            .chain(SCALE_COLUMNS.iter().map(|c| (*c).to_string()))
            .collect();
        Self { month, year }
    }
}

/// One covariate table and how its values reach the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CovariateSource {
    /// One value per visit in `<stem>_1..3`; `non_answer_codes` become null.
    Series {
        name: String,
        file: String,
        stem: String,
        #[serde(default)]
        non_answer_codes: Vec<f64>,
    },
    /// Per-visit sub-question columns reduced to one code per visit.
    Derived {
        name: String,
        file: String,
        derivation: Derivation,
    },
    /// Subject-level table whose columns are carried through unchanged.
    Static { file: String },
}

impl CovariateSource {
    /// Output column name; static tables contribute their own column names.
    pub fn name(&self) -> Option<&str> {
        match self {
            CovariateSource::Series { name, .. } | CovariateSource::Derived { name, .. } => {
                Some(name)
            }
            CovariateSource::Static { .. } => None,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            CovariateSource::Series { file, .. }
            | CovariateSource::Derived { file, .. }
            | CovariateSource::Static { file } => file,
        }
    }
}

fn default_covariates() -> Vec<CovariateSource> {
    vec![
        CovariateSource::Derived {
            name: "education".to_string(),
            file: "education.csv".to_string(),
            derivation: Derivation::Education,
        },
        CovariateSource::Static {
            file: "deprivation.csv".to_string(),
        },
        CovariateSource::Series {
            name: "smoking".to_string(),
            file: "tobacco.csv".to_string(),
            stem: "smoking".to_string(),
            non_answer_codes: vec![-3.0],
        },
        CovariateSource::Series {
            name: "alc_freq".to_string(),
            file: "alcohol.csv".to_string(),
            stem: "alc_freq".to_string(),
            non_answer_codes: vec![-3.0],
        },
        CovariateSource::Derived {
            name: "activity".to_string(),
            file: "activity_type.csv".to_string(),
            derivation: Derivation::Activity,
        },
        CovariateSource::Series {
            name: "bmi".to_string(),
            file: "bmi.csv".to_string(),
            stem: "bmi".to_string(),
            non_answer_codes: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_granularities() {
        let config = PipelineConfig::default();
        assert_eq!(config.aggregation.month.len(), 19);
        assert_eq!(config.aggregation.year.len(), 30);
        assert_eq!(config.event_columns(&Granularity::ALL).len(), 30);
        assert_eq!(config.event_columns(&[Granularity::Month]).len(), 19);
        assert!(
            !config
                .event_columns(&[Granularity::Month])
                .contains(&"aa_ehrt".to_string())
        );
        assert_eq!(config.placeholder_dates.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_the_default() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let text = r#"
data_dir = "/data/ukb"
separator = ","
missing_visit_policy = "carry_forward"
absent_window_policy = "always_present"
placeholder_dates = ["1900-01-01"]

[inputs]
presence = "id_present.csv"

[inputs.events_format]
encoding = "utf-8"

[[covariates]]
kind = "series"
name = "smoking"
file = "tobacco.csv"
stem = "smoking"
non_answer_codes = [-3]
"#;
        let config: PipelineConfig = toml::from_str(text).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/ukb"));
        assert_eq!(config.separator, ',');
        assert_eq!(config.missing_visit_policy, MissingVisitPolicy::CarryForward);
        assert_eq!(config.absent_window_policy, AbsentWindowPolicy::AlwaysPresent);
        assert_eq!(config.inputs.presence.as_deref(), Some("id_present.csv"));
        assert_eq!(config.inputs.events_format.delimiter, ',');
        assert_eq!(config.inputs.events, "meds_cleaned.csv");
        assert_eq!(config.covariates.len(), 1);
        assert_eq!(
            config.placeholder_dates,
            vec![NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()]
        );
    }

    #[test]
    fn duplicate_covariate_names_are_rejected() {
        let mut config = PipelineConfig::default();
        config.covariates.push(CovariateSource::Series {
            name: "bmi".to_string(),
            file: "bmi2.csv".to_string(),
            stem: "bmi".to_string(),
            non_answer_codes: Vec::new(),
        });
        assert!(matches!(
            config.validate(),
            Err(PanelError::InvalidConfig { .. })
        ));
    }
}
