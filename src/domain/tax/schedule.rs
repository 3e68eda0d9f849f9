//! Time-of-day fee lookup

use chrono::NaiveTime;

use crate::domain::rules::RuleSet;

/// Fee for a passage at `time`.
///
/// Ranges are scanned in configured order and the first one containing
/// `time` wins, so overlapping ranges resolve to whichever is declared
/// first. Times not covered by any range are free.
pub fn fee_at(time: NaiveTime, rules: &RuleSet) -> u32 {
    rules
        .time_ranges()
        .iter()
        .find(|range| range.contains(time))
        .map_or(0, |range| range.amount)
}
