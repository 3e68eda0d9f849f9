//! Single-charge windows and the daily cap

use chrono::NaiveDateTime;

use super::schedule::fee_at;
use crate::domain::rules::RuleSet;

/// Passages billed together: everything within the window length of
/// `start`, charged once at the highest fee seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWindow {
    pub start: NaiveDateTime,
    pub max_fee: u32,
}

impl DailyWindow {
    fn open(start: NaiveDateTime, fee: u32) -> Self {
        Self { start, max_fee: fee }
    }

    /// Membership is measured from the window start, never from the
    /// previous passage. Whole minutes, boundary inclusive.
    fn admits(&self, passage: NaiveDateTime, window_minutes: i64) -> bool {
        (passage - self.start).num_minutes() <= window_minutes
    }
}

/// Split one day's passages (sorted ascending) into single-charge windows.
pub fn windows_for_day(sorted_passages: &[NaiveDateTime], rules: &RuleSet) -> Vec<DailyWindow> {
    let window_minutes = rules.single_charge_window_minutes();
    let mut windows: Vec<DailyWindow> = Vec::new();

    for &passage in sorted_passages {
        let fee = fee_at(passage.time(), rules);

        match windows.last_mut() {
            Some(current) if current.admits(passage, window_minutes) => {
                current.max_fee = current.max_fee.max(fee);
            }
            _ => windows.push(DailyWindow::open(passage, fee)),
        }
    }

    windows
}

/// Charge for one calendar day: the sum of window maxima, capped at the
/// rule set's daily maximum. An empty day costs nothing.
pub fn charge_for_day(sorted_passages: &[NaiveDateTime], rules: &RuleSet) -> u32 {
    let total = windows_for_day(sorted_passages, rules)
        .iter()
        .fold(0u32, |acc, w| acc.saturating_add(w.max_fee));

    total.min(rules.max_daily_charge())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::fixtures::gothenburg;
    use crate::domain::rules::{RuleSource, TimeRangeSource};
    use crate::domain::tax::passage::parse_passage;

    fn day(times: &[&str]) -> Vec<NaiveDateTime> {
        let mut passages: Vec<_> = times
            .iter()
            .map(|t| parse_passage(&format!("2013-02-04 {}", t)).unwrap())
            .collect();
        passages.sort();
        passages
    }

    fn flat_rules(window: i64, cap: i64) -> RuleSet {
        RuleSet::try_from(RuleSource {
            city: "Flat".into(),
            year: 2013,
            currency: "SEK".into(),
            max_daily_tax: cap,
            single_charge_window_minutes: window,
            toll_free_vehicle_types: vec![],
            toll_free_months: vec![],
            time_ranges: vec![TimeRangeSource {
                from: "00:00".into(),
                to: "23:59".into(),
                amount: 10,
            }],
            public_holidays: vec![],
        })
        .unwrap()
    }

    #[test]
    fn empty_day_is_free() {
        assert_eq!(charge_for_day(&[], &gothenburg()), 0);
        assert!(windows_for_day(&[], &gothenburg()).is_empty());
    }

    #[test]
    fn single_passage_is_its_own_fee() {
        assert_eq!(charge_for_day(&day(&["07:30:00"]), &gothenburg()), 18);
    }

    #[test]
    fn close_passages_charge_highest_fee_once() {
        assert_eq!(charge_for_day(&day(&["06:20:00", "06:45:00"]), &gothenburg()), 13);
        assert_eq!(
            charge_for_day(&day(&["06:20:00", "06:45:00", "07:10:00"]), &gothenburg()),
            18
        );
    }

    #[test]
    fn distant_passages_are_charged_separately() {
        assert_eq!(charge_for_day(&day(&["06:20:00", "08:00:00"]), &gothenburg()), 21);
    }

    #[test]
    fn exact_window_length_stays_in_window() {
        let windows = windows_for_day(&day(&["15:00:00", "16:00:00"]), &gothenburg());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].max_fee, 18);
    }

    #[test]
    fn partial_minutes_are_truncated() {
        // 60 minutes 59 seconds still counts as 60 whole minutes.
        let windows = windows_for_day(&day(&["10:00:00", "11:00:59"]), &flat_rules(60, 100));
        assert_eq!(windows.len(), 1);

        let windows = windows_for_day(&day(&["10:00:00", "11:01:00"]), &flat_rules(60, 100));
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn window_start_does_not_slide() {
        // Each passage is 40 minutes after the previous one. A sliding window
        // would merge all four; anchoring on the start yields two windows.
        let passages = day(&["10:00:00", "10:40:00", "11:20:00", "12:00:00"]);
        let windows = windows_for_day(&passages, &flat_rules(60, 100));
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, passages[0]);
        assert_eq!(windows[1].start, passages[2]);
        assert_eq!(charge_for_day(&passages, &flat_rules(60, 100)), 20);
    }

    #[test]
    fn zero_fee_passages_still_join_windows() {
        // 18:29 (8) opens a window; 18:35 (0) joins it rather than opening one.
        let windows = windows_for_day(&day(&["18:29:00", "18:35:00", "19:40:00"]), &gothenburg());
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].max_fee, 8);
        assert_eq!(windows[1].max_fee, 0);
    }

    #[test]
    fn daily_total_is_capped() {
        let passages = day(&[
            "06:00:00", "07:15:00", "08:30:00", "15:00:00", "16:00:00", "17:30:00",
        ]);
        assert_eq!(charge_for_day(&passages, &gothenburg()), 60);
    }

    #[test]
    fn cap_does_not_apply_below_maximum() {
        let passages = day(&["10:00:00", "12:00:00"]);
        assert_eq!(charge_for_day(&passages, &flat_rules(60, 100)), 20);
        assert_eq!(charge_for_day(&passages, &flat_rules(60, 15)), 15);
        assert_eq!(charge_for_day(&passages, &flat_rules(60, 0)), 0);
    }

    #[test]
    fn zero_minute_window_only_merges_same_minute() {
        let passages = day(&["10:00:00", "10:00:40", "10:01:00"]);
        let windows = windows_for_day(&passages, &flat_rules(0, 100));
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn busy_afternoon_splits_into_expected_windows() {
        let passages = day(&[
            "06:20:27", "06:27:00", "14:35:00", "15:29:00", "15:47:00", "16:01:00", "16:48:00",
            "17:49:00", "18:29:00", "18:35:00",
        ]);
        let fees: Vec<u32> = windows_for_day(&passages, &gothenburg())
            .iter()
            .map(|w| w.max_fee)
            .collect();
        assert_eq!(fees, vec![8, 13, 18, 18, 13]);
        assert_eq!(charge_for_day(&passages, &gothenburg()), 60);
    }
}
