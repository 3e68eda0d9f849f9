//! Congestion tax calculation across days

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use super::calendar::is_toll_free_date;
use super::daily::charge_for_day;
use super::passage::parse_passages;
use crate::domain::rules::RuleSet;
use crate::domain::VehicleType;
use crate::support::errors::DomainResult;

/// Outcome of a tax calculation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaxResult {
    pub total_tax: u32,
    /// Charge per calendar date, ascending. Toll-free dates are present with 0.
    pub tax_by_date: BTreeMap<NaiveDate, u32>,
    /// Set when the vehicle type itself is exempt
    pub toll_free: bool,
}

impl TaxResult {
    fn toll_free_vehicle() -> Self {
        Self {
            toll_free: true,
            ..Self::default()
        }
    }
}

/// Calculate the tax owed for `raw_timestamps` under `rules`.
///
/// Exempt vehicle types return immediately without looking at the
/// timestamps. Otherwise every timestamp must parse; the first malformed one
/// fails the whole calculation. Input order does not matter.
pub fn calculate<S: AsRef<str>>(
    vehicle: VehicleType,
    raw_timestamps: &[S],
    rules: &RuleSet,
) -> DomainResult<TaxResult> {
    if rules.is_toll_free_vehicle(vehicle) {
        return Ok(TaxResult::toll_free_vehicle());
    }

    let mut passages = parse_passages(raw_timestamps)?;
    passages.sort();

    Ok(calculate_sorted(&passages, rules))
}

/// Group already-sorted passages by date and charge each day.
pub fn calculate_sorted(sorted_passages: &[NaiveDateTime], rules: &RuleSet) -> TaxResult {
    let mut result = TaxResult::default();

    for day in sorted_passages.chunk_by(|a, b| a.date() == b.date()) {
        let date = day[0].date();

        let charge = if is_toll_free_date(date, rules) {
            0
        } else {
            charge_for_day(day, rules)
        };

        result.tax_by_date.insert(date, charge);
        result.total_tax = result.total_tax.saturating_add(charge);
    }

    result
}
