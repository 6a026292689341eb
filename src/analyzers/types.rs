//! Serializable report types.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzers::rank::RankBy;

/// One ranked consumable. Averages are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// 1-based position, 1 being the safest.
    pub rank: usize,
    pub item: String,
    pub total_score: f64,
    pub times_consumed: u32,
    pub average_score: f64,
    /// `average_score` reached the warning threshold.
    pub warning: bool,
    /// Symptoms whose own average reached the warning threshold.
    pub warning_symptoms: Vec<String>,
    /// Average intensity of each associated symptom per occurrence.
    pub symptoms: BTreeMap<String, f64>,
}

/// Complete ranking written to the output file.
///
/// Carries no wall-clock data, so identical input always serializes to
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rank_by: RankBy,
    pub symptom_onset_hours: u32,
    pub min_times_consumed: u32,
    pub symptom_warning_score: f64,
    /// Diary rows dropped as malformed.
    pub skipped_rows: usize,
    pub consumables: Vec<ReportEntry>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.consumables.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.consumables.iter().filter(|e| e.warning).count()
    }
}
