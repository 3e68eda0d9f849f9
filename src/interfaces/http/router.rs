//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::TaxService;
use crate::domain::{RuleSource, TimeRangeSource, VehicleType};
use crate::interfaces::http::common::ApiResponse;

use super::modules::{
    health, metrics::{http_metrics_middleware, prometheus_metrics, MetricsState},
    request_id::request_id_middleware, rules, tax,
};

/// State shared by the tax, rule and health routes.
/// Each handler extracts its own state through `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<TaxService>,
    pub started_at: Arc<Instant>,
}

impl FromRef<ApiState> for tax::TaxState {
    fn from_ref(s: &ApiState) -> Self {
        tax::TaxState {
            service: Arc::clone(&s.service),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            service: Arc::clone(&s.service),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        tax::calculate_tax,
        rules::list_rules,
        rules::get_rules,
    ),
    components(
        schemas(
            ApiResponse<String>,
            VehicleType,
            tax::TaxRequest,
            tax::TaxResponse,
            rules::RuleSummary,
            RuleSource,
            TimeRangeSource,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Tax", description = "Congestion tax calculation for a vehicle's passages"),
        (name = "Rules", description = "City tax rules currently loaded"),
    ),
    info(
        title = "Congestion Tax API",
        version = "1.0.0",
        description = "Calculates congestion tax from toll station passages using per-city rules",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `/metrics` is mounted only when a Prometheus handle is given.
pub fn create_api_router(service: Arc<TaxService>, prometheus: Option<PrometheusHandle>) -> Router {
    let state = ApiState {
        service,
        started_at: Arc::new(Instant::now()),
    };

    let tax_routes = Router::new()
        .route("/calculate", post(tax::calculate_tax))
        .with_state(state.clone());

    let rule_routes = Router::new()
        .route("/", get(rules::list_rules))
        .route("/{city}", get(rules::get_rules))
        .with_state(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check).with_state(state))
        .nest("/api/v1/tax", tax_routes)
        .nest("/api/v1/rules", rule_routes);

    if let Some(handle) = prometheus {
        router = router.route(
            "/metrics",
            get(prometheus_metrics).with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::infrastructure::rules::{RuleLoader, RuleRegistry};
    use crate::interfaces::http::modules::request_id::REQUEST_ID_HEADER;

    fn app() -> Router {
        let registry = RuleRegistry::shared();
        RuleLoader::new(registry.clone()).load_builtin().unwrap();
        create_api_router(Arc::new(TaxService::new(registry, "gothenburg")), None)
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn calculate(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn calculates_single_passage() {
        let (status, body) = send(
            app(),
            calculate(
                "/api/v1/tax/calculate",
                json!({"vehicleType": "CAR", "dates": ["2013-02-07 07:30:00"]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["totalTax"], 18);
        assert_eq!(body["data"]["city"], "Gothenburg");
        assert_eq!(body["data"]["currency"], "SEK");
        assert_eq!(body["data"]["vehicleType"], "CAR");
        assert_eq!(body["data"]["taxByDate"]["2013-02-07"], 18);
        assert_eq!(body["data"]["tollFree"], false);
    }

    #[tokio::test]
    async fn explicit_city_is_case_insensitive() {
        let (status, body) = send(
            app(),
            calculate(
                "/api/v1/tax/calculate?city=Gothenburg",
                json!({"vehicleType": "car", "dates": ["2013-02-07 15:45:00", "2013-02-07 06:10:00"]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalTax"], 26);
    }

    #[tokio::test]
    async fn toll_free_vehicle_pays_nothing() {
        let (status, body) = send(
            app(),
            calculate(
                "/api/v1/tax/calculate",
                json!({"vehicleType": "emergency", "dates": ["2013-02-07 07:30:00"]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalTax"], 0);
        assert_eq!(body["data"]["tollFree"], true);
        assert_eq!(body["data"]["taxByDate"], json!({}));
    }

    #[tokio::test]
    async fn missing_vehicle_type_is_bad_request() {
        let (status, body) = send(
            app(),
            calculate("/api/v1/tax/calculate", json!({"dates": ["2013-02-07 07:30:00"]})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn empty_dates_is_unprocessable() {
        let (status, body) = send(
            app(),
            calculate("/api/v1/tax/calculate", json!({"vehicleType": "CAR", "dates": []})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().starts_with("dates:"));
    }

    #[tokio::test]
    async fn unknown_city_is_bad_request() {
        let (status, body) = send(
            app(),
            calculate(
                "/api/v1/tax/calculate?city=stockholm",
                json!({"vehicleType": "CAR", "dates": ["2013-02-07 07:30:00"]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No tax rules found for city: stockholm");
    }

    #[tokio::test]
    async fn malformed_timestamp_is_bad_request() {
        let (status, body) = send(
            app(),
            calculate(
                "/api/v1/tax/calculate",
                json!({"vehicleType": "CAR", "dates": ["2013-02-07T07:30:00"]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("2013-02-07T07:30:00"));
    }

    #[tokio::test]
    async fn lists_loaded_rules() {
        let (status, body) = send(app(), get_req("/api/v1/rules")).await;

        assert_eq!(status, StatusCode::OK);
        let rules = body["data"].as_array().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0]["key"], "gothenburg");
        assert_eq!(rules[0]["maxDailyTax"], 60);
        assert_eq!(rules[0]["isDefault"], true);
    }

    #[tokio::test]
    async fn returns_full_rules_for_city() {
        let (status, body) = send(app(), get_req("/api/v1/rules/GOTHENBURG")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["city"], "Gothenburg");
        assert_eq!(body["data"]["timeRanges"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn unknown_rules_are_not_found() {
        let (status, body) = send(app(), get_req("/api/v1/rules/stockholm")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn health_reports_loaded_cities() {
        let (status, body) = send(app(), get_req("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cities"], json!(["gothenburg"]));
    }

    #[tokio::test]
    async fn health_is_degraded_without_default_city() {
        let registry = RuleRegistry::shared();
        RuleLoader::new(registry.clone()).load_builtin().unwrap();
        let router = create_api_router(Arc::new(TaxService::new(registry, "malmo")), None);

        let (status, body) = send(router, get_req("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn metrics_route_absent_without_recorder() {
        let (status, _) = send(app(), get_req("/metrics")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let req = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[REQUEST_ID_HEADER], "abc-123");
    }

    #[tokio::test]
    async fn request_id_is_generated_when_absent() {
        let resp = app().oneshot(get_req("/health")).await.unwrap();
        let id = resp.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn published_rules_keep_range_seconds() {
        let registry = RuleRegistry::shared();
        let source: RuleSource = serde_json::from_value(json!({
            "city": "Testville",
            "maxDailyTax": 60,
            "singleChargeWindowMinutes": 60,
            "timeRanges": [{"from": "06:00:00", "to": "06:29:59", "amount": 8}]
        }))
        .unwrap();
        registry.register(crate::domain::RuleSet::try_from(source).unwrap());
        let router = create_api_router(Arc::new(TaxService::new(registry, "testville")), None);

        let (status, body) = send(router, get_req("/api/v1/rules/testville")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["timeRanges"][0]["to"], "06:29:59");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(app(), get_req("/api-doc/openapi.json")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/tax/calculate"].is_object());
    }
}
