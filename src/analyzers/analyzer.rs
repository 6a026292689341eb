use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate_consumables;
use crate::analyzers::rank::rank_consumables;
use crate::analyzers::types::Report;
use crate::analyzers::window::SymptomTimeline;
use crate::config::Config;
use crate::error::{DiaryError, Result};
use crate::events::Diary;
use crate::output::write_report;
use crate::parser::parse_diary;

/// Attributes symptoms to consumptions and ranks the consumables.
#[tracing::instrument(
    skip_all,
    fields(
        consumptions = diary.consumptions.len(),
        symptoms = diary.symptoms.len(),
        onset_hours = config.symptom_onset_hours
    )
)]
pub fn analyze(diary: &Diary, config: &Config) -> Report {
    let timeline = SymptomTimeline::new(diary.symptoms.clone());
    let stats = aggregate_consumables(&diary.consumptions, &timeline, config.onset_window());
    let consumables = rank_consumables(stats.into_values(), config);

    for entry in consumables.iter().filter(|e| e.warning) {
        warn!(
            item = %entry.item,
            average_score = entry.average_score,
            symptoms = ?entry.warning_symptoms,
            "Consumable reached the symptom warning score"
        );
    }

    Report {
        rank_by: config.rank_by,
        symptom_onset_hours: config.symptom_onset_hours,
        min_times_consumed: config.min_times_consumed,
        symptom_warning_score: config.symptom_warning_score,
        skipped_rows: diary.skipped_rows,
        consumables,
    }
}

/// Parses the configured diary, ranks it and writes the report.
///
/// An empty ranking still produces a report; it is only an error when
/// `fail_on_empty` is set, and then only after the report is written.
pub fn run(config: &Config) -> Result<Report> {
    let diary = parse_diary(&config.input_file, config)?;

    if diary.skipped_rows > 0 {
        warn!(skipped_rows = diary.skipped_rows, "Some diary rows were skipped");
    }

    let report = analyze(&diary, config);
    write_report(&config.output_file, &report, config.output_format())?;

    info!(
        consumptions = diary.consumptions.len(),
        symptoms = diary.symptoms.len(),
        skipped_rows = diary.skipped_rows,
        ranked = report.consumables.len(),
        warnings = report.warning_count(),
        output = %config.output_file.display(),
        "Report written"
    );

    if report.is_empty() {
        warn!(
            min_times_consumed = config.min_times_consumed,
            "No consumables passed filtering"
        );
        if config.fail_on_empty {
            return Err(DiaryError::EmptyResult);
        }
    }

    Ok(report)
}
