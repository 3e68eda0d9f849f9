//! Toll-free calendar dates

use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::rules::RuleSet;

/// Whether no passage on `date` is charged: weekends, toll-free months,
/// public holidays and the day before a public holiday.
pub fn is_toll_free_date(date: NaiveDate, rules: &RuleSet) -> bool {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return true;
    }

    if rules.is_toll_free_month(date.month()) {
        return true;
    }

    if rules.is_public_holiday(date) {
        return true;
    }

    // Eve of a holiday. `succ_opt` is only `None` at NaiveDate::MAX.
    date.succ_opt()
        .is_some_and(|next| rules.is_public_holiday(next))
}
