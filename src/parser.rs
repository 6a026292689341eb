//! CSV parser for symptom diary exports.
//!
//! Each row carries a date, a time and a categorization column, followed by
//! either consumed items or `symptom, intensity` pairs:
//!
//! ```text
//! 03/30/2022, 18:57, Dinner, "Sushi, Cucumber Rolls", [1 plate], Seaweed
//! 03/30/2022, 20:10, Symptom, Bloating, " Intensity: 4", Duration, 30 min
//! ```
//!
//! Malformed rows are logged and skipped; they never abort the run.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{DiaryError, Result};
use crate::events::{ConsumptionEvent, Diary, SymptomEvent};

const DATE_COLUMN: usize = 0;
const TIME_COLUMN: usize = 1;
const CATEGORIZATION_COLUMN: usize = 2;
const FIRST_ENTRY_COLUMN: usize = CATEGORIZATION_COLUMN + 1;

/// Category value that marks a row of symptom/intensity pairs.
pub const SYMPTOM_CATEGORY: &str = "Symptom";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

enum ParsedRow {
    Consumptions(Vec<ConsumptionEvent>),
    Symptoms(Vec<SymptomEvent>),
    Ignored,
}

/// Reads the diary export at `path` into consumption and symptom events.
///
/// # Errors
///
/// Returns [`DiaryError::FileNotFound`] if `path` does not exist,
/// [`DiaryError::FileRead`] if it cannot be opened, and
/// [`DiaryError::NoUsableRecords`] if not a single row produced an event.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn parse_diary(path: &Path, config: &Config) -> Result<Diary> {
    if !path.exists() {
        return Err(DiaryError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| DiaryError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let diary = parse_reader(file, config)?;
    if diary.is_empty() {
        return Err(DiaryError::NoUsableRecords {
            path: path.to_path_buf(),
        });
    }

    debug!(
        consumptions = diary.consumptions.len(),
        symptoms = diary.symptoms.len(),
        skipped_rows = diary.skipped_rows,
        "Diary parsed"
    );
    Ok(diary)
}

/// Parses a diary export from any reader. The first row is treated as a header.
pub fn parse_reader<R: Read>(reader: R, config: &Config) -> Result<Diary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut diary = Diary::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable diary row");
                diary.skipped_rows += 1;
                continue;
            }
        };

        let row = record.position().map(|p| p.line()).unwrap_or_default();

        match parse_row(&record, row, config) {
            Ok(ParsedRow::Consumptions(events)) => diary.consumptions.extend(events),
            Ok(ParsedRow::Symptoms(events)) => diary.symptoms.extend(events),
            Ok(ParsedRow::Ignored) => {}
            Err(e) => {
                warn!(error = %e, "Skipping malformed diary row");
                diary.skipped_rows += 1;
            }
        }
    }

    Ok(diary)
}

fn parse_row(record: &StringRecord, row: u64, config: &Config) -> Result<ParsedRow> {
    let category = required_cell(record, CATEGORIZATION_COLUMN, "categorization", row)?;

    let is_symptom = category == SYMPTOM_CATEGORY;
    if !is_symptom && !config.is_consumable_category(&category) {
        return Ok(ParsedRow::Ignored);
    }

    let date = required_cell(record, DATE_COLUMN, "date", row)?;
    let time = required_cell(record, TIME_COLUMN, "time", row)?;
    let timestamp = parse_timestamp(&date, &time).ok_or_else(|| DiaryError::RowParse {
        row,
        reason: format!("unparseable timestamp '{} {}'", date, time),
    })?;

    if is_symptom {
        parse_symptoms(record, timestamp, row, config).map(ParsedRow::Symptoms)
    } else {
        Ok(ParsedRow::Consumptions(parse_consumptions(record, timestamp, &category)))
    }
}

/// Every cell after the categorization column is an item; amount
/// annotations such as `[1 cup]` are ignored.
fn parse_consumptions(
    record: &StringRecord,
    timestamp: NaiveDateTime,
    category: &str,
) -> Vec<ConsumptionEvent> {
    record
        .iter()
        .skip(FIRST_ENTRY_COLUMN)
        .map(clean_cell)
        .filter(|item| !item.is_empty() && !item.starts_with('['))
        .map(|item| ConsumptionEvent::new(&item, timestamp, category))
        .collect()
}

/// Symptom rows come as `[name, intensity, name, intensity, ...]`.
fn parse_symptoms(
    record: &StringRecord,
    timestamp: NaiveDateTime,
    row: u64,
    config: &Config,
) -> Result<Vec<SymptomEvent>> {
    let mut events = Vec::new();

    for i in (FIRST_ENTRY_COLUMN..record.len()).step_by(2) {
        let name = clean_cell(&record[i]);

        // Duration pairs describe the previous symptom, not a new one.
        if name.is_empty() || name.starts_with("Duration") || !config.includes_symptom(&name) {
            continue;
        }

        let raw = record.get(i + 1).ok_or_else(|| DiaryError::RowParse {
            row,
            reason: format!("symptom '{}' has no intensity", name),
        })?;

        let intensity = parse_intensity(raw).ok_or_else(|| DiaryError::RowParse {
            row,
            reason: format!("unparseable intensity '{}' for '{}'", raw.trim(), name),
        })?;

        events.push(SymptomEvent::new(&name, timestamp, intensity));
    }

    Ok(events)
}

fn required_cell(record: &StringRecord, index: usize, column: &str, row: u64) -> Result<String> {
    record
        .get(index)
        .map(clean_cell)
        .filter(|cell| !cell.is_empty())
        .ok_or_else(|| DiaryError::RowParse {
            row,
            reason: format!("missing {} column", column),
        })
}

/// Removes surrounding whitespace and any double quotes from a cell.
pub fn clean_cell(cell: &str) -> String {
    cell.replace('"', "").trim().to_string()
}

/// Joins a date and a time cell and parses them as one local timestamp.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", clean_cell(date), clean_cell(time));
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&joined, format).ok())
}

/// Largest accepted intensity. Keeps summed scores finite for any diary size.
pub const MAX_INTENSITY: f64 = 1_000_000.0;

/// Accepts both `" Intensity: 7"` and a bare `7`, within `0..=MAX_INTENSITY`.
pub fn parse_intensity(cell: &str) -> Option<f64> {
    let cleaned = clean_cell(cell);
    let value = cleaned.strip_prefix("Intensity:").unwrap_or(&cleaned).trim();
    value
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=MAX_INTENSITY).contains(v))
}
