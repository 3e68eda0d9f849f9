//! Rule listing handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::RuleSummary;
use crate::domain::{DomainError, RuleSource};
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse};
use crate::interfaces::http::modules::tax::TaxState;

#[utoipa::path(
    get,
    path = "/api/v1/rules",
    tag = "Rules",
    responses(
        (status = 200, description = "Loaded cities", body = ApiResponse<Vec<RuleSummary>>)
    )
)]
pub async fn list_rules(State(state): State<TaxState>) -> Json<ApiResponse<Vec<RuleSummary>>> {
    let service = &state.service;
    let summaries = service
        .cities()
        .iter()
        .filter_map(|city| service.rules_for(city).ok())
        .map(|rules| RuleSummary::new(&rules, service.default_city()))
        .collect();

    Json(ApiResponse::success(summaries))
}

#[utoipa::path(
    get,
    path = "/api/v1/rules/{city}",
    tag = "Rules",
    params(("city" = String, Path, description = "City name, case-insensitive")),
    responses(
        (status = 200, description = "Full rule document", body = ApiResponse<RuleSource>),
        (status = 404, description = "No rules for this city")
    )
)]
pub async fn get_rules(
    State(state): State<TaxState>,
    Path(city): Path<String>,
) -> Result<Json<ApiResponse<RuleSource>>, ApiError> {
    match state.service.rules_for(&city) {
        Ok(rules) => Ok(Json(ApiResponse::success(rules.to_source()))),
        Err(e @ DomainError::UnknownCity(_)) => Err(api_error(StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
