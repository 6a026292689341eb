//! Report formatting and persistence.
//!
//! Supports pretty-printed JSON and flat CSV. The output file is always
//! truncated and rewritten.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::types::{Report, ReportEntry};
use crate::error::{DiaryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// `.csv` (any case) selects CSV; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }
}

/// Flat CSV row; per-symptom detail only appears in JSON.
#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    item: &'a str,
    total_score: f64,
    times_consumed: u32,
    average_score: f64,
    warning: bool,
}

impl<'a> From<&'a ReportEntry> for CsvRow<'a> {
    fn from(entry: &'a ReportEntry) -> Self {
        CsvRow {
            rank: entry.rank,
            item: &entry.item,
            total_score: entry.total_score,
            times_consumed: entry.times_consumed,
            average_score: entry.average_score,
            warning: entry.warning,
        }
    }
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Writes `report` to `path`, overwriting any existing file.
pub fn write_report(path: &Path, report: &Report, format: OutputFormat) -> Result<()> {
    debug!(path = %path.display(), ?format, entries = report.consumables.len(), "Writing report");

    let to_write_error = |source: std::io::Error| DiaryError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_write_error)?;

    match format {
        OutputFormat::Json => {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, report).map_err(|e| {
                if e.is_io() {
                    to_write_error(e.into())
                } else {
                    DiaryError::Json(e)
                }
            })?;
            writer.write_all(b"\n").map_err(to_write_error)?;
            writer.flush().map_err(to_write_error)?;
        }
        OutputFormat::Csv => {
            // Header comes from the row struct, so an empty report needs it written by hand.
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer
                .write_record([
                    "rank",
                    "item",
                    "total_score",
                    "times_consumed",
                    "average_score",
                    "warning",
                ])
                .map_err(|e| csv_write_error(path, e))?;
            for entry in &report.consumables {
                writer
                    .serialize(CsvRow::from(entry))
                    .map_err(|e| csv_write_error(path, e))?;
            }
            writer.flush().map_err(to_write_error)?;
        }
    }

    print_pretty(report);
    Ok(())
}

fn csv_write_error(path: &Path, e: csv::Error) -> DiaryError {
    if e.is_io_error() {
        DiaryError::OutputWrite {
            path: path.to_path_buf(),
            source: e.into(),
        }
    } else {
        DiaryError::Csv(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::rank::RankBy;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn entry(rank: usize, item: &str, total: f64, warning: bool) -> ReportEntry {
        ReportEntry {
            rank,
            item: item.to_string(),
            total_score: total,
            times_consumed: 2,
            average_score: total / 2.0,
            warning,
            warning_symptoms: Vec::new(),
            symptoms: BTreeMap::from([("Headache".to_string(), total / 2.0)]),
        }
    }

    fn report(consumables: Vec<ReportEntry>) -> Report {
        Report {
            rank_by: RankBy::Total,
            symptom_onset_hours: 4,
            min_times_consumed: 1,
            symptom_warning_score: 5.0,
            skipped_rows: 0,
            consumables,
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Json);
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report(vec![entry(1, "Rice", 0.0, false)]));
    }

    #[test]
    fn test_write_json_preserves_rank_order() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("report.json");

        let report = report(vec![entry(1, "Rice", 0.0, false), entry(2, "Eggs", 12.0, true)]);
        write_report(&path, &report, OutputFormat::Json).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let consumables = json["consumables"].as_array().unwrap();
        assert_eq!(consumables[0]["item"], "Rice");
        assert_eq!(consumables[1]["item"], "Eggs");
        assert_eq!(consumables[1]["warning"], true);
        assert_eq!(json["rank_by"], "total");
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("report.json");
        fs::write(&path, "x".repeat(10_000)).unwrap();

        write_report(&path, &report(vec![]), OutputFormat::Json).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains('x'));
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(json["consumables"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_csv_rows() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("report.csv");

        let report = report(vec![entry(1, "Rice", 0.0, false), entry(2, "Eggs", 12.0, true)]);
        write_report(&path, &report, OutputFormat::Csv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "rank,item,total_score,times_consumed,average_score,warning"
        );
        assert!(lines[1].starts_with("1,Rice,"));
        assert!(lines[2].starts_with("2,Eggs,12.0,2,6.0,true"));
    }

    #[test]
    fn test_write_csv_empty_report_has_header() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("report.csv");

        write_report(&path, &report(vec![]), OutputFormat::Csv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_csv_io_failure_is_output_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full");
        let err = csv_write_error(Path::new("/full/report.csv"), csv::Error::from(io_err));

        match err {
            DiaryError::OutputWrite { path, source } => {
                assert_eq!(path, Path::new("/full/report.csv"));
                assert_eq!(source.kind(), std::io::ErrorKind::WriteZero);
            }
            other => panic!("expected OutputWrite, got {other:?}"),
        }
    }

    #[test]
    fn test_write_to_missing_directory_is_output_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("no_such_dir").join("report.json");

        let result = write_report(&path, &report(vec![]), OutputFormat::Json);
        assert!(matches!(result, Err(DiaryError::OutputWrite { .. })));
    }
}
