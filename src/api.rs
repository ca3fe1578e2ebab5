use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::analysis_error::AnalysisError;
use crate::models::{
    BandCounts, ClassifiedSensitivity, DailyTable, DailyTableRow, DiffTableRow, ForecastRecord,
    HeatmapRow, Measurement, MetricSummary, ObservationPoint, OverviewRequest, OverviewResult,
    PercentileProfile, RollingMeans, Season, SeasonSummary, SensitivityRecord, SensitivityRequest,
    SensitivityResult, SensitivityType, StationStatus, StationStatusInput, StatusBand3,
    StatusBand5, StatusRequest, StatusResult, TrendMetric, VerificationRequest,
    VerificationResult, YearSummary,
};
use crate::services::{ClassificationService, ObservationService, VerificationService};

#[derive(Clone)]
pub struct AppState {
    pub observation_service: ObservationService,
    pub verification_service: VerificationService,
    pub classification_service: ClassificationService,
    pub aggregation_timeout: Duration,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, post_overview, post_verification, post_sensitivity, post_status),
    components(schemas(
        HealthResponse,
        ObservationPoint,
        Measurement,
        OverviewRequest,
        OverviewResult,
        DailyTable,
        DailyTableRow,
        DiffTableRow,
        RollingMeans,
        TrendMetric,
        ForecastRecord,
        VerificationRequest,
        VerificationResult,
        YearSummary,
        MetricSummary,
        SeasonSummary,
        Season,
        HeatmapRow,
        SensitivityRecord,
        SensitivityRequest,
        SensitivityResult,
        ClassifiedSensitivity,
        SensitivityType,
        PercentileProfile,
        StationStatusInput,
        StatusRequest,
        StatusResult,
        StationStatus,
        StatusBand5,
        StatusBand3,
        BandCounts,
    )),
    tags((name = "groundwater", description = "Groundwater level aggregation and verification"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/observations/overview", post(post_overview))
        .route("/forecasts/verification", post(post_verification))
        .route("/sensitivity", post(post_sensitivity))
        .route("/status", post(post_status))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

/// Run one aggregation on the blocking pool within the time budget.
async fn run_bounded<T, F>(budget: Duration, label: &'static str, work: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
{
    match tokio::time::timeout(budget, tokio::task::spawn_blocking(work)).await {
        Err(_) => {
            error!("{} exceeded its time budget of {:?}", label, budget);
            Err(StatusCode::GATEWAY_TIMEOUT)
        }
        Ok(Err(e)) => {
            error!("{} worker failed: {}", label, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Ok(Ok(Err(e))) => {
            warn!("{} rejected input: {}", label, e);
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
        Ok(Ok(Ok(result))) => Ok(result),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "groundwater",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/observations/overview",
    tag = "groundwater",
    request_body = OverviewRequest,
    responses(
        (status = 200, description = "Daily table, geomap means and trend indicators", body = OverviewResult),
        (status = 504, description = "Aggregation exceeded its time budget")
    )
)]
#[instrument(skip(state, request), fields(stations = request.stations.len()))]
async fn post_overview(
    State(state): State<AppState>,
    Json(request): Json<OverviewRequest>,
) -> Result<Json<OverviewResult>, StatusCode> {
    debug!("Building overview for {} stations", request.stations.len());
    let service = state.observation_service.clone();
    let result = run_bounded(state.aggregation_timeout, "overview", move || {
        Ok(service.build_overview(&request))
    })
    .await?;

    info!(
        "Overview: {} rows, {} stations, {} missing",
        result.table.rows.len(),
        result.geomap.len(),
        result.missing_stations.len()
    );

    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/forecasts/verification",
    tag = "groundwater",
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Per-year verification statistics and deviation heatmap", body = VerificationResult),
        (status = 422, description = "Invalid forecast records"),
        (status = 504, description = "Aggregation exceeded its time budget")
    )
)]
#[instrument(skip(state, request), fields(records = request.records.len()))]
async fn post_verification(
    State(state): State<AppState>,
    Json(request): Json<VerificationRequest>,
) -> Result<Json<VerificationResult>, StatusCode> {
    debug!("Verifying {} forecast records", request.records.len());
    let service = state.verification_service.clone();
    let result = run_bounded(state.aggregation_timeout, "verification", move || {
        service.verify(&request)
    })
    .await?;

    info!("Verification covers {} years", result.years.len());
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/sensitivity",
    tag = "groundwater",
    request_body = SensitivityRequest,
    responses(
        (status = 200, description = "Rainfall/drought response type per station", body = SensitivityResult),
        (status = 504, description = "Aggregation exceeded its time budget")
    )
)]
#[instrument(skip(state, request), fields(stations = request.stations.len()))]
async fn post_sensitivity(
    State(state): State<AppState>,
    Json(request): Json<SensitivityRequest>,
) -> Result<Json<SensitivityResult>, StatusCode> {
    let service = state.classification_service.clone();
    let result = run_bounded(state.aggregation_timeout, "sensitivity", move || {
        Ok(service.classify_sensitivity(&request))
    })
    .await?;

    info!("Classified sensitivity of {} stations", result.stations.len());
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/status",
    tag = "groundwater",
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Percentile status bands per station", body = StatusResult),
        (status = 504, description = "Aggregation exceeded its time budget")
    )
)]
#[instrument(skip(state, request), fields(stations = request.stations.len()))]
async fn post_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<StatusResult>, StatusCode> {
    let service = state.classification_service.clone();
    let result = run_bounded(state.aggregation_timeout, "status", move || {
        Ok(service.band_statuses(&request))
    })
    .await?;

    info!(
        "Banded {} stations ({} without data)",
        result.stations.len(),
        result.band_counts.no_data
    );
    Ok(Json(result))
}
