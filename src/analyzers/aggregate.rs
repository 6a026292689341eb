use std::collections::BTreeMap;

use chrono::Duration;
use tracing::debug;

use crate::analyzers::window::SymptomTimeline;
use crate::events::ConsumptionEvent;
use crate::stats::ConsumableStats;

/// Accumulates a [`ConsumableStats`] per distinct consumable name.
///
/// Every consumption counts once toward `times_consumed`. Its contribution is
/// the summed intensity of every symptom inside its onset window, so a symptom
/// following several consumptions counts against each of them.
pub fn aggregate_consumables(
    consumptions: &[ConsumptionEvent],
    timeline: &SymptomTimeline,
    window: Duration,
) -> BTreeMap<String, ConsumableStats> {
    let mut stats: BTreeMap<String, ConsumableStats> = BTreeMap::new();
    let mut matched_total = 0usize;

    for consumption in consumptions {
        let matched = timeline.matches_for(consumption, window);
        matched_total += matched.len();

        stats
            .entry(consumption.item_name.clone())
            .or_insert_with(|| ConsumableStats::new(&consumption.item_name))
            .record_occurrence(matched);
    }

    debug!(
        consumables = stats.len(),
        consumptions = consumptions.len(),
        matched_total,
        "Consumption scores aggregated"
    );

    stats
}
