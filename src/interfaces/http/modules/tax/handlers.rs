//! Tax calculation handler

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use super::dto::{CityQuery, TaxRequest, TaxResponse};
use crate::application::TaxService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};

#[derive(Clone)]
pub struct TaxState {
    pub service: Arc<TaxService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/tax/calculate",
    tag = "Tax",
    params(CityQuery),
    request_body = TaxRequest,
    responses(
        (status = 200, description = "Tax calculated", body = ApiResponse<TaxResponse>),
        (status = 400, description = "Malformed body, timestamp or unknown city"),
        (status = 422, description = "No passages given")
    )
)]
pub async fn calculate_tax(
    State(state): State<TaxState>,
    Query(query): Query<CityQuery>,
    ValidatedJson(req): ValidatedJson<TaxRequest>,
) -> Result<Json<ApiResponse<TaxResponse>>, ApiError> {
    let city = query.city.as_deref().filter(|c| !c.trim().is_empty());

    state
        .service
        .calculate(req.vehicle_type, &req.dates, city)
        .map(|assessment| Json(ApiResponse::success(assessment.into())))
        .map_err(domain_error)
}
