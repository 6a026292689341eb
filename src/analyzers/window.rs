use chrono::{Duration, NaiveDateTime};

use crate::events::{ConsumptionEvent, SymptomEvent};

/// Symptom events sorted by time, searchable by onset window.
#[derive(Debug, Default)]
pub struct SymptomTimeline {
    events: Vec<SymptomEvent>,
}

impl SymptomTimeline {
    /// Sorts `events` by timestamp. Events sharing a timestamp keep source order.
    pub fn new(mut events: Vec<SymptomEvent>) -> Self {
        events.sort_by_key(|e| e.timestamp);
        Self { events }
    }

    /// Symptoms with `start <= timestamp <= start + window`.
    pub fn within(&self, start: NaiveDateTime, window: Duration) -> &[SymptomEvent] {
        let end = start
            .checked_add_signed(window)
            .unwrap_or(NaiveDateTime::MAX);

        let lo = self.events.partition_point(|e| e.timestamp < start);
        let hi = self.events.partition_point(|e| e.timestamp <= end);

        &self.events[lo..hi.max(lo)]
    }

    /// Symptoms attributable to one consumption.
    pub fn matches_for(&self, consumption: &ConsumptionEvent, window: Duration) -> &[SymptomEvent] {
        self.within(consumption.timestamp, window)
    }
}
