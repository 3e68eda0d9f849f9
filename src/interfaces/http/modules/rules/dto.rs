//! Rule DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::RuleSet;

/// One loaded city, without its schedule
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    /// Lookup key for `?city=`
    pub key: String,
    pub city: String,
    pub year: i32,
    pub currency: String,
    pub max_daily_tax: u32,
    pub single_charge_window_minutes: i64,
    pub is_default: bool,
}

impl RuleSummary {
    pub fn new(rules: &RuleSet, default_city: &str) -> Self {
        Self {
            key: rules.key().to_string(),
            city: rules.city().to_string(),
            year: rules.year(),
            currency: rules.currency().to_string(),
            max_daily_tax: rules.max_daily_charge(),
            single_charge_window_minutes: rules.single_charge_window_minutes(),
            is_default: rules.key() == crate::domain::city_key(default_city),
        }
    }
}
