use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::types::ReportEntry;
use crate::analyzers::utility::{round2, score_then_name};
use crate::config::Config;
use crate::stats::ConsumableStats;

/// Primary sort key for the ranking. Ties always fall back to the name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    /// Cumulative danger across every occurrence.
    #[default]
    Total,
    /// Danger per occurrence.
    Average,
}

impl RankBy {
    pub fn score(self, stats: &ConsumableStats) -> f64 {
        match self {
            RankBy::Total => stats.total_score,
            RankBy::Average => stats.average_score(),
        }
    }
}

/// Drops rarely eaten consumables and orders the rest safest first.
///
/// Entries whose average score reaches `symptom_warning_score` are flagged,
/// not dropped.
pub fn rank_consumables(
    stats: impl IntoIterator<Item = ConsumableStats>,
    config: &Config,
) -> Vec<ReportEntry> {
    let mut kept: Vec<ConsumableStats> = stats
        .into_iter()
        .filter(|s| s.times_consumed > 0 && s.times_consumed >= config.min_times_consumed)
        .collect();

    let rank_by = config.rank_by;
    kept.sort_by(|a, b| {
        score_then_name((rank_by.score(a), a.name.as_str()), (rank_by.score(b), b.name.as_str()))
    });

    debug!(kept = kept.len(), ?rank_by, "Consumables ranked");

    kept.into_iter()
        .enumerate()
        .map(|(index, stats)| to_entry(index + 1, stats, config.symptom_warning_score))
        .collect()
}

fn to_entry(rank: usize, stats: ConsumableStats, threshold: f64) -> ReportEntry {
    let average = stats.average_score();
    let symptom_averages = stats.symptom_averages();

    let warning_symptoms = symptom_averages
        .iter()
        .filter(|(_, avg)| **avg >= threshold)
        .map(|(name, _)| name.clone())
        .collect();

    ReportEntry {
        rank,
        item: stats.name,
        total_score: stats.total_score,
        times_consumed: stats.times_consumed,
        average_score: round2(average),
        warning: average >= threshold,
        warning_symptoms,
        symptoms: symptom_averages
            .into_iter()
            .map(|(name, avg)| (name, round2(avg)))
            .collect(),
    }
}
