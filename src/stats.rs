use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::SymptomEvent;

/// Running danger totals for one consumable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsumableStats {
    pub name: String,
    /// Sum of matched symptom intensities across every occurrence.
    pub total_score: f64,
    /// Occurrences, counted whether or not any symptom followed.
    pub times_consumed: u32,
    /// Per-symptom share of `total_score`.
    pub symptom_totals: BTreeMap<String, f64>,
}

impl ConsumableStats {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Records one occurrence together with the symptoms matched to it.
    pub fn record_occurrence(&mut self, matched: &[SymptomEvent]) {
        self.times_consumed += 1;

        for symptom in matched {
            self.total_score += symptom.intensity;
            *self
                .symptom_totals
                .entry(symptom.symptom_name.clone())
                .or_default() += symptom.intensity;
        }
    }

    pub fn average(total: f64, count: u32) -> f64 {
        if count == 0 {
            0.0
        } else {
            total / f64::from(count)
        }
    }

    pub fn average_score(&self) -> f64 {
        Self::average(self.total_score, self.times_consumed)
    }

    /// Average intensity of each associated symptom per occurrence.
    pub fn symptom_averages(&self) -> BTreeMap<String, f64> {
        self.symptom_totals
            .iter()
            .map(|(name, total)| (name.clone(), Self::average(*total, self.times_consumed)))
            .collect()
    }
}
