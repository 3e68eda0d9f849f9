//! Tax calculation DTOs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::TaxAssessment;
use crate::domain::VehicleType;

/// Vehicle and its passages through toll stations
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxRequest {
    /// Vehicle type, case-insensitive
    pub vehicle_type: VehicleType,
    /// Passage timestamps as `yyyy-MM-dd HH:mm:ss`, any order
    #[validate(length(min = 1, message = "at least one passage timestamp is required"))]
    #[schema(example = json!(["2013-02-08 06:27:00", "2013-02-08 15:47:00"]))]
    pub dates: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CityQuery {
    /// City whose rules apply. Defaults to the configured default city
    pub city: Option<String>,
}

/// Calculated congestion tax
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxResponse {
    pub vehicle_type: VehicleType,
    pub city: String,
    pub currency: String,
    pub total_tax: u32,
    /// Charge per calendar day (`yyyy-MM-dd`), only days with passages
    pub tax_by_date: BTreeMap<String, u32>,
    /// Vehicle type is exempt in this city
    pub toll_free: bool,
}

impl From<TaxAssessment> for TaxResponse {
    fn from(a: TaxAssessment) -> Self {
        Self {
            vehicle_type: a.vehicle,
            city: a.city,
            currency: a.currency,
            total_tax: a.result.total_tax,
            tax_by_date: a
                .result
                .tax_by_date
                .into_iter()
                .map(|(date, tax)| (date.to_string(), tax))
                .collect(),
            toll_free: a.result.toll_free,
        }
    }
}
