//! Tax service: resolves a city's rules and runs the tax engine

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::tax::{self, TaxResult};
use crate::domain::{DomainError, DomainResult, RuleRepository, RuleSet, VehicleType};

/// Result of a calculation together with the rules it was made under
#[derive(Debug, Clone)]
pub struct TaxAssessment {
    pub vehicle: VehicleType,
    pub city: String,
    pub currency: String,
    pub result: TaxResult,
}

/// Service for congestion tax calculations
pub struct TaxService {
    rules: Arc<dyn RuleRepository>,
    default_city: String,
}

impl TaxService {
    pub fn new(rules: Arc<dyn RuleRepository>, default_city: impl Into<String>) -> Self {
        Self {
            rules,
            default_city: default_city.into(),
        }
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    pub fn cities(&self) -> Vec<String> {
        self.rules.list_cities()
    }

    pub fn rules_for(&self, city: &str) -> DomainResult<Arc<RuleSet>> {
        self.rules
            .find_by_city(city)
            .ok_or_else(|| DomainError::UnknownCity(city.to_string()))
    }

    /// Calculate the tax for `vehicle` passing at `dates` in `city`
    /// (the configured default city when `None`).
    pub fn calculate<S: AsRef<str>>(
        &self,
        vehicle: VehicleType,
        dates: &[S],
        city: Option<&str>,
    ) -> DomainResult<TaxAssessment> {
        let city = city.unwrap_or(&self.default_city);

        let outcome = self
            .rules_for(city)
            .and_then(|rules| tax::calculate(vehicle, dates, &rules).map(|r| (rules, r)));

        let (rules, result) = match outcome {
            Ok(ok) => ok,
            Err(e) => {
                warn!(city, vehicle_type = %vehicle, error = %e, "Tax calculation rejected");
                metrics::counter!("tax_calculations_total", "outcome" => "rejected").increment(1);
                return Err(e);
            }
        };

        if result.toll_free {
            debug!(city = rules.city(), vehicle_type = %vehicle, "Toll-free vehicle");
            metrics::counter!("tax_calculations_total", "outcome" => "toll_free_vehicle")
                .increment(1);
        } else {
            info!(
                city = rules.city(),
                vehicle_type = %vehicle,
                passages = dates.len(),
                days = result.tax_by_date.len(),
                total_tax = result.total_tax,
                currency = rules.currency(),
                "Congestion tax calculated"
            );
            metrics::counter!("tax_calculations_total", "outcome" => "charged").increment(1);
            metrics::counter!("tax_charged_total", "city" => rules.key().to_string())
                .increment(u64::from(result.total_tax));
        }

        Ok(TaxAssessment {
            vehicle,
            city: rules.city().to_string(),
            currency: rules.currency().to_string(),
            result,
        })
    }
}
