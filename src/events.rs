//! Structured diary events produced by the parser.

use chrono::NaiveDateTime;

/// One consumed item from a meal, drink or medication entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionEvent {
    pub item_name: String,
    pub timestamp: NaiveDateTime,
    pub category: String,
}

/// One reported symptom with its intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomEvent {
    pub symptom_name: String,
    pub timestamp: NaiveDateTime,
    pub intensity: f64,
}

/// Everything extracted from a single diary export, in source order.
#[derive(Debug, Default)]
pub struct Diary {
    pub consumptions: Vec<ConsumptionEvent>,
    pub symptoms: Vec<SymptomEvent>,
    pub skipped_rows: usize,
}

impl Diary {
    /// True when no row produced an event.
    pub fn is_empty(&self) -> bool {
        self.consumptions.is_empty() && self.symptoms.is_empty()
    }
}

impl ConsumptionEvent {
    pub fn new(item_name: &str, timestamp: NaiveDateTime, category: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            timestamp,
            category: category.to_string(),
        }
    }
}

impl SymptomEvent {
    pub fn new(symptom_name: &str, timestamp: NaiveDateTime, intensity: f64) -> Self {
        Self {
            symptom_name: symptom_name.to_string(),
            timestamp,
            intensity,
        }
    }
}
