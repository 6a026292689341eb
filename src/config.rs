//! Run configuration.
//!
//! Defaults come from a sidecar JSON file (`config.json` unless `--config`
//! names another one); any flag given on the command line wins. The result
//! is an immutable [`Config`] built once at startup and borrowed by every
//! pipeline stage.

use std::path::{Path, PathBuf};

use chrono::Duration;
use clap::{ArgAction, Parser};
use serde::Deserialize;
use tracing::debug;

use crate::analyzers::rank::RankBy;
use crate::error::{DiaryError, Result};
use crate::output::OutputFormat;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

// ── CLI ────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
#[command(name = "symptom_rater")]
#[command(
    about = "Rank diary foods by the symptoms that follow them",
    long_about = None,
    version
)]
pub struct Cli {
    /// JSON file supplying defaults for every other option
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV diary export to analyze
    #[arg(short, long, value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Report file to write (overwritten if present)
    #[arg(short, long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Consumable categories to analyze, e.g. Breakfast Snack Medication
    #[arg(short, long, num_args = 1..)]
    pub consumables: Option<Vec<String>>,

    /// Symptoms to analyze; a bare `-s` analyzes every symptom
    #[arg(short, long, num_args = 0..)]
    pub symptoms: Option<Vec<String>>,

    /// Skip consumables eaten fewer times than this
    #[arg(short, long)]
    pub min_times_consumed: Option<u32>,

    /// Flag consumables whose average symptom score reaches this value
    #[arg(short = 'w', long)]
    pub symptom_warning_score: Option<f64>,

    /// Hours after consumption in which symptoms are attributed to it
    #[arg(short = 'H', long)]
    pub symptom_onset_hours: Option<u32>,

    /// Primary sort key for the ranking
    #[arg(long, value_enum)]
    pub rank_by: Option<RankBy>,

    /// Report format (inferred from the output file extension by default)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Exit non-zero when no consumable passes filtering (`--fail-on-empty false` to disable)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub fail_on_empty: Option<bool>,
}

// ── Sidecar file ───────────────────────────────────────────────────────────────

/// Defaults loaded from the sidecar config file. Every key is optional.
///
/// ```json
/// {
///   "input_file": "export.csv",
///   "consumables": ["Breakfast", "Lunch", "Dinner"],
///   "symptom_onset_hours": 6
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub consumables: Option<Vec<String>>,
    pub symptoms: Option<Vec<String>>,
    pub min_times_consumed: Option<u32>,
    pub symptom_warning_score: Option<f64>,
    pub symptom_onset_hours: Option<u32>,
    pub rank_by: Option<RankBy>,
    pub format: Option<OutputFormat>,
    pub fail_on_empty: Option<bool>,
}

impl FileConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DiaryError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ── Resolved config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub consumables: Vec<String>,
    /// Empty means every symptom counts.
    pub symptoms: Vec<String>,
    pub min_times_consumed: u32,
    pub symptom_warning_score: f64,
    pub symptom_onset_hours: u32,
    pub rank_by: RankBy,
    /// `None` defers to the output file extension.
    pub format: Option<OutputFormat>,
    pub fail_on_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("diary.csv"),
            output_file: PathBuf::from("safe_foods.json"),
            consumables: ["Breakfast", "Lunch", "Dinner", "Snack", "Drinks"]
                .into_iter()
                .map(String::from)
                .collect(),
            symptoms: Vec::new(),
            min_times_consumed: 3,
            symptom_warning_score: 5.0,
            symptom_onset_hours: 4,
            rank_by: RankBy::Total,
            format: None,
            fail_on_empty: false,
        }
    }
}

impl Config {
    /// Locates the sidecar file and merges it with `cli`.
    ///
    /// A missing `config.json` falls back to built-in defaults; a missing
    /// file named explicitly with `--config` is an error.
    pub fn load(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) if !path.exists() => {
                return Err(DiaryError::Config(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            Some(path) => FileConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                FileConfig::default()
            }
        };

        Self::resolve(cli, file)
    }

    /// CLI value, else file value, else built-in default.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let defaults = Config::default();

        let config = Config {
            input_file: cli
                .input_file
                .or(file.input_file)
                .unwrap_or(defaults.input_file),
            output_file: cli
                .output_file
                .or(file.output_file)
                .unwrap_or(defaults.output_file),
            consumables: cli
                .consumables
                .or(file.consumables)
                .unwrap_or(defaults.consumables),
            symptoms: cli.symptoms.or(file.symptoms).unwrap_or(defaults.symptoms),
            min_times_consumed: cli
                .min_times_consumed
                .or(file.min_times_consumed)
                .unwrap_or(defaults.min_times_consumed),
            symptom_warning_score: cli
                .symptom_warning_score
                .or(file.symptom_warning_score)
                .unwrap_or(defaults.symptom_warning_score),
            symptom_onset_hours: cli
                .symptom_onset_hours
                .or(file.symptom_onset_hours)
                .unwrap_or(defaults.symptom_onset_hours),
            rank_by: cli.rank_by.or(file.rank_by).unwrap_or(defaults.rank_by),
            format: cli.format.or(file.format),
            fail_on_empty: cli
                .fail_on_empty
                .or(file.fail_on_empty)
                .unwrap_or(defaults.fail_on_empty),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.symptom_warning_score.is_finite() {
            return Err(DiaryError::Config(
                "symptom_warning_score must be a finite number".to_string(),
            ));
        }
        if self.consumables.is_empty() {
            return Err(DiaryError::Config(
                "at least one consumable category is required".to_string(),
            ));
        }
        Ok(())
    }

    /// The onset window as a duration.
    pub fn onset_window(&self) -> Duration {
        Duration::hours(i64::from(self.symptom_onset_hours))
    }

    pub fn is_consumable_category(&self, category: &str) -> bool {
        self.consumables.iter().any(|c| c == category)
    }

    pub fn includes_symptom(&self, name: &str) -> bool {
        self.symptoms.is_empty() || self.symptoms.iter().any(|s| s == name)
    }

    /// Explicit format, or the one implied by the output file extension.
    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_else(|| OutputFormat::from_path(&self.output_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(json.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_cli_defaults_are_unset() {
        let cli = Cli::parse_from(["symptom_rater"]);
        assert!(cli.input_file.is_none());
        assert!(cli.consumables.is_none());
        assert!(cli.rank_by.is_none());
        assert!(cli.fail_on_empty.is_none());
    }

    #[test]
    fn test_cli_all_flags() {
        let cli = Cli::parse_from([
            "symptom_rater",
            "-i",
            "in.csv",
            "-o",
            "out.csv",
            "-c",
            "Breakfast",
            "Medication",
            "-s",
            "Headache",
            "-m",
            "2",
            "-w",
            "6.5",
            "-H",
            "8",
            "--rank-by",
            "average",
            "--format",
            "csv",
            "--fail-on-empty",
        ]);

        assert_eq!(cli.input_file, Some(PathBuf::from("in.csv")));
        assert_eq!(cli.output_file, Some(PathBuf::from("out.csv")));
        assert_eq!(
            cli.consumables,
            Some(vec!["Breakfast".to_string(), "Medication".to_string()])
        );
        assert_eq!(cli.symptoms, Some(vec!["Headache".to_string()]));
        assert_eq!(cli.min_times_consumed, Some(2));
        assert_eq!(cli.symptom_warning_score, Some(6.5));
        assert_eq!(cli.symptom_onset_hours, Some(8));
        assert_eq!(cli.rank_by, Some(RankBy::Average));
        assert_eq!(cli.format, Some(OutputFormat::Csv));
        assert_eq!(cli.fail_on_empty, Some(true));
    }

    #[test]
    fn test_help_flag_is_display_help() {
        let err = Cli::try_parse_from(["symptom_rater", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_resolve_uses_builtin_defaults() {
        let config = Config::resolve(Cli::default(), FileConfig::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_resolve_file_overrides_defaults() {
        let file = FileConfig {
            min_times_consumed: Some(1),
            symptom_onset_hours: Some(12),
            rank_by: Some(RankBy::Average),
            ..Default::default()
        };
        let config = Config::resolve(Cli::default(), file).unwrap();

        assert_eq!(config.min_times_consumed, 1);
        assert_eq!(config.symptom_onset_hours, 12);
        assert_eq!(config.rank_by, RankBy::Average);
        assert_eq!(config.input_file, PathBuf::from("diary.csv"));
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file = FileConfig {
            min_times_consumed: Some(1),
            symptoms: Some(vec!["Bloating".to_string()]),
            ..Default::default()
        };
        let cli = Cli::parse_from(["symptom_rater", "-m", "4"]);
        let config = Config::resolve(cli, file).unwrap();

        assert_eq!(config.min_times_consumed, 4);
        assert_eq!(config.symptoms, vec!["Bloating".to_string()]);
    }

    #[test]
    fn test_cli_can_reset_file_settings() {
        let file = FileConfig {
            symptoms: Some(vec!["Bloating".to_string()]),
            fail_on_empty: Some(true),
            ..Default::default()
        };
        let cli = Cli::parse_from(["symptom_rater", "-s", "--fail-on-empty", "false"]);
        assert_eq!(cli.symptoms, Some(Vec::new()));

        let config = Config::resolve(cli, file).unwrap();
        assert!(config.symptoms.is_empty());
        assert!(config.includes_symptom("Nausea"));
        assert!(!config.fail_on_empty);
    }

    #[test]
    fn test_fail_on_empty_from_file_is_kept() {
        let file = FileConfig {
            fail_on_empty: Some(true),
            ..Default::default()
        };
        let config = Config::resolve(Cli::default(), file).unwrap();
        assert!(config.fail_on_empty);
    }

    #[test]
    fn test_resolve_rejects_non_finite_warning_score() {
        let file = FileConfig {
            symptom_warning_score: Some(f64::INFINITY),
            ..Default::default()
        };
        let result = Config::resolve(Cli::default(), file);
        assert!(matches!(result, Err(DiaryError::Config(_))));
    }

    #[test]
    fn test_file_config_load() {
        let file = write_config(
            r#"{
                "input_file": "export.csv",
                "consumables": ["Breakfast", "Medication"],
                "symptom_warning_score": 7,
                "rank_by": "average",
                "format": "json"
            }"#,
        );

        let loaded = FileConfig::load(file.path()).unwrap();
        assert_eq!(loaded.input_file, Some(PathBuf::from("export.csv")));
        assert_eq!(
            loaded.consumables,
            Some(vec!["Breakfast".to_string(), "Medication".to_string()])
        );
        assert_eq!(loaded.symptom_warning_score, Some(7.0));
        assert_eq!(loaded.rank_by, Some(RankBy::Average));
        assert_eq!(loaded.format, Some(OutputFormat::Json));
        assert!(loaded.symptoms.is_none());
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let file = write_config(r#"{ "colour": "blue" }"#);
        let result = FileConfig::load(file.path());
        assert!(matches!(result, Err(DiaryError::Json(_))));
    }

    #[test]
    fn test_load_with_explicit_missing_config_fails() {
        let cli = Cli {
            config: Some(PathBuf::from("/no/such/config.json")),
            ..Default::default()
        };
        assert!(matches!(Config::load(cli), Err(DiaryError::Config(_))));
    }

    #[test]
    fn test_load_with_explicit_config() {
        let file = write_config(r#"{ "symptom_onset_hours": 2 }"#);
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = Config::load(cli).unwrap();
        assert_eq!(config.symptom_onset_hours, 2);
        assert_eq!(config.onset_window(), Duration::hours(2));
    }

    #[test]
    fn test_symptom_filter_empty_means_all() {
        let config = Config::default();
        assert!(config.includes_symptom("Anything"));

        let config = Config {
            symptoms: vec!["Headache".to_string()],
            ..Config::default()
        };
        assert!(config.includes_symptom("Headache"));
        assert!(!config.includes_symptom("Nausea"));
    }

    #[test]
    fn test_output_format_inferred_from_extension() {
        let config = Config {
            output_file: PathBuf::from("report.CSV"),
            ..Config::default()
        };
        assert_eq!(config.output_format(), OutputFormat::Csv);

        let config = Config {
            output_file: PathBuf::from("report.csv"),
            format: Some(OutputFormat::Json),
            ..Config::default()
        };
        assert_eq!(config.output_format(), OutputFormat::Json);
    }
}
