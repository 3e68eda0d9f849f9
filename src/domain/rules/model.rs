//! Rule set domain entity
//!
//! [`RuleSource`] mirrors the JSON rule file one-to-one. [`RuleSet`] is the
//! validated, normalized form the fee engine works with: vehicle tags are
//! resolved to [`VehicleType`], dates and times are parsed, and every
//! lookup set is built once at construction.

use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::VehicleType;
use crate::support::errors::{DomainError, DomainResult};

const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw time range as written in a rule file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeRangeSource {
    /// Start of the range, `HH:mm` (inclusive)
    pub from: String,
    /// End of the range, `HH:mm` (inclusive). Earlier than `from` when the
    /// range wraps past midnight.
    pub to: String,
    /// Fee charged for a passage inside the range
    pub amount: i64,
}

/// Raw rule file for one city and year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleSource {
    pub city: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub currency: String,
    /// Cap applied to each calendar day
    #[serde(alias = "maxDailyCharge")]
    pub max_daily_tax: i64,
    pub single_charge_window_minutes: i64,
    #[serde(default)]
    pub toll_free_vehicle_types: Vec<String>,
    #[serde(default)]
    pub toll_free_months: Vec<i64>,
    /// Checked in order; the first matching range wins
    #[serde(default)]
    pub time_ranges: Vec<TimeRangeSource>,
    /// ISO dates (`yyyy-MM-dd`)
    #[serde(default)]
    pub public_holidays: Vec<String>,
}

/// A fee schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: NaiveTime,
    pub to: NaiveTime,
    pub amount: u32,
}

impl TimeRange {
    pub fn wraps_midnight(&self) -> bool {
        self.to < self.from
    }

    /// Both ends are inclusive.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps_midnight() {
            time >= self.from || time <= self.to
        } else {
            self.from <= time && time <= self.to
        }
    }
}

/// Validated congestion tax rules for one city
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    city: String,
    key: String,
    year: i32,
    currency: String,
    max_daily_charge: u32,
    single_charge_window_minutes: i64,
    toll_free_vehicles: HashSet<VehicleType>,
    toll_free_months: BTreeSet<u32>,
    time_ranges: Vec<TimeRange>,
    public_holidays: BTreeSet<NaiveDate>,
}

/// Lower-cased, trimmed city name used as the registry key.
pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

impl RuleSet {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn max_daily_charge(&self) -> u32 {
        self.max_daily_charge
    }

    pub fn single_charge_window_minutes(&self) -> i64 {
        self.single_charge_window_minutes
    }

    pub fn time_ranges(&self) -> &[TimeRange] {
        &self.time_ranges
    }

    pub fn is_toll_free_vehicle(&self, vehicle: VehicleType) -> bool {
        self.toll_free_vehicles.contains(&vehicle)
    }

    pub fn is_toll_free_month(&self, month: u32) -> bool {
        self.toll_free_months.contains(&month)
    }

    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.public_holidays.contains(&date)
    }

    /// Render back into the file representation, with normalized values.
    pub fn to_source(&self) -> RuleSource {
        let mut vehicles: Vec<VehicleType> = self.toll_free_vehicles.iter().copied().collect();
        vehicles.sort();

        RuleSource {
            city: self.city.clone(),
            year: self.year,
            currency: self.currency.clone(),
            max_daily_tax: i64::from(self.max_daily_charge),
            single_charge_window_minutes: self.single_charge_window_minutes,
            toll_free_vehicle_types: vehicles.iter().map(|v| v.as_str().to_string()).collect(),
            toll_free_months: self.toll_free_months.iter().map(|&m| i64::from(m)).collect(),
            time_ranges: self
                .time_ranges
                .iter()
                .map(|r| TimeRangeSource {
                    from: format_time(r.from),
                    to: format_time(r.to),
                    amount: i64::from(r.amount),
                })
                .collect(),
            public_holidays: self
                .public_holidays
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
        }
    }
}

impl TryFrom<RuleSource> for RuleSet {
    type Error = DomainError;

    fn try_from(source: RuleSource) -> DomainResult<Self> {
        let city = source.city.trim().to_string();
        let invalid = |reason: String| DomainError::InvalidRules {
            city: if city.is_empty() { "<unnamed>".to_string() } else { city.clone() },
            reason,
        };

        if city.is_empty() {
            return Err(invalid("city must not be blank".into()));
        }

        let max_daily_charge = u32::try_from(source.max_daily_tax).map_err(|_| {
            invalid(format!(
                "maxDailyTax must be a non-negative integer, got {}",
                source.max_daily_tax
            ))
        })?;

        if source.single_charge_window_minutes < 0 {
            return Err(invalid(format!(
                "singleChargeWindowMinutes must be non-negative, got {}",
                source.single_charge_window_minutes
            )));
        }

        let toll_free_vehicles = source
            .toll_free_vehicle_types
            .iter()
            .map(|tag| {
                tag.parse::<VehicleType>()
                    .map_err(|_| invalid(format!("unknown toll-free vehicle type '{}'", tag)))
            })
            .collect::<DomainResult<HashSet<_>>>()?;

        let toll_free_months = source
            .toll_free_months
            .iter()
            .map(|&m| match u32::try_from(m) {
                Ok(month @ 1..=12) => Ok(month),
                _ => Err(invalid(format!("toll-free month {} is outside 1-12", m))),
            })
            .collect::<DomainResult<BTreeSet<_>>>()?;

        let time_ranges = source
            .time_ranges
            .iter()
            .enumerate()
            .map(|(i, r)| -> DomainResult<TimeRange> {
                let from = parse_time(&r.from)
                    .ok_or_else(|| invalid(format!("timeRanges[{}].from '{}' is not HH:mm", i, r.from)))?;
                let to = parse_time(&r.to)
                    .ok_or_else(|| invalid(format!("timeRanges[{}].to '{}' is not HH:mm", i, r.to)))?;
                let amount = u32::try_from(r.amount).map_err(|_| {
                    invalid(format!("timeRanges[{}].amount must be non-negative, got {}", i, r.amount))
                })?;
                Ok(TimeRange { from, to, amount })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let public_holidays = source
            .public_holidays
            .iter()
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), DATE_FORMAT)
                    .map_err(|_| invalid(format!("public holiday '{}' is not yyyy-MM-dd", d)))
            })
            .collect::<DomainResult<BTreeSet<_>>>()?;

        Ok(Self {
            key: city_key(&city),
            city,
            year: source.year,
            currency: source.currency.trim().to_string(),
            max_daily_charge,
            single_charge_window_minutes: source.single_charge_window_minutes,
            toll_free_vehicles,
            toll_free_months,
            time_ranges,
            public_holidays,
        })
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// `HH:mm`, or `HH:mm:ss` when the seconds are not zero.
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

// ── Tests ──────────────────────────────────────────────────────
