use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::assessment::{AssessedSample, RiskAssessment, TargetError, WaterQualityForecast};
use crate::buoy::{BuoyReading, ColumnStatistics};
use crate::fetch_error::FetchError;
use crate::prediction::{ModelError, PredictedSample, PredictionTable};
use crate::risk::{CriticalConditions, RiskLevel, RiskSummary, Severity};
use crate::services::buoy_service::{StationReadings, StationStatistics};
use crate::services::risk_service::{Classification, SampleSummary};
use crate::services::{BuoyService, RiskService, ServiceError};
use crate::session::{RenderContext, SessionStore};
use crate::stations::{Region, Station};
use crate::water_quality::{MonthlyAverage, SampleAverages, ValidationError, WaterSample};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub buoy_service: BuoyService,
    pub risk_service: RiskService,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    fn render_context(&self, session_id: &str) -> RenderContext {
        RenderContext::new(session_id, self.sessions.clone())
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    /// Dissolved oxygen values in mg/L; `null` is counted as unclassified.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectStationRequest {
    pub station_id: String,
    /// Region to resolve the id in; needed for ids listed under several regions.
    #[serde(default)]
    pub region: Option<String>,
}

/// Error returned by handlers: a status code and a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Fetch(FetchError::InvalidStationId(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Validation(ValidationError::MissingColumn(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Validation(ValidationError::Csv(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Model(ModelError::ArtifactMissing(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Model(_) | ServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::UnknownStation(_) | ServiceError::NoStationSelected(_) => StatusCode::NOT_FOUND,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

fn csv_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], body).into_response()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations))
        .route("/stations/{station_id}", get(get_station))
        .route("/stations/{station_id}/readings", get(get_readings))
        .route("/stations/{station_id}/readings.csv", get(get_readings_csv))
        .route("/stations/{station_id}/statistics", get(get_statistics))
        .route("/risk/classify", post(classify_risk))
        .route("/risk/assess", post(assess_risk))
        .route("/risk/assess.csv", post(assess_risk_csv))
        .route("/predictions", post(predict_water_quality))
        .route("/samples/summary", post(summarize_samples))
        .route("/sessions/{session_id}/station", put(select_station))
        .route("/sessions/{session_id}/readings", get(get_session_readings))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "health"
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
    get,
    path = "/api/v1/stations",
    responses((status = 200, description = "Regions and their stations", body = [Region])),
    tag = "stations"
)]
#[instrument(skip(state))]
async fn list_stations(State(state): State<AppState>) -> Json<Vec<Region>> {
    let regions = state.buoy_service.regions();
    info!("Listing {} regions", regions.len());
    Json(regions)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}",
    params(("station_id" = String, Path, description = "NDBC station id")),
    responses(
        (status = 200, description = "Station metadata", body = Station),
        (status = 400, description = "Malformed station id", body = ErrorResponse),
        (status = 404, description = "Station not registered", body = ErrorResponse)
    ),
    tag = "stations"
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_station(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<Station>, ApiError> {
    let station = state.buoy_service.station(&station_id).map_err(|e| {
        warn!("Station lookup for {} failed: {}", station_id, e);
        ApiError::from(e)
    })?;
    Ok(Json(station.clone()))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/readings",
    params(("station_id" = String, Path, description = "NDBC station id")),
    responses(
        (status = 200, description = "Parsed feed, most recent first", body = StationReadings),
        (status = 404, description = "Station not registered", body = ErrorResponse),
        (status = 502, description = "NDBC feed unavailable", body = ErrorResponse)
    ),
    tag = "readings"
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_readings(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<StationReadings>, ApiError> {
    debug!("Fetching readings for station {}", station_id);
    let readings = state
        .buoy_service
        .station_readings(&station_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch readings for station {}: {}", station_id, e);
            ApiError::from(e)
        })?;

    info!("Returning {} readings for station {}", readings.row_count, station_id);
    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/readings.csv",
    params(("station_id" = String, Path, description = "NDBC station id")),
    responses(
        (status = 200, description = "Parsed feed as CSV", body = String, content_type = "text/csv"),
        (status = 502, description = "NDBC feed unavailable", body = ErrorResponse)
    ),
    tag = "readings"
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_readings_csv(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Response, ApiError> {
    let csv = state
        .buoy_service
        .station_readings_csv(&station_id)
        .await
        .map_err(|e| {
            error!("Failed to export readings for station {}: {}", station_id, e);
            ApiError::from(e)
        })?;
    Ok(csv_response(csv))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/statistics",
    params(("station_id" = String, Path, description = "NDBC station id")),
    responses(
        (status = 200, description = "Per-column descriptive statistics", body = StationStatistics),
        (status = 502, description = "NDBC feed unavailable", body = ErrorResponse)
    ),
    tag = "readings"
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_statistics(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<StationStatistics>, ApiError> {
    let statistics = state
        .buoy_service
        .station_statistics(&station_id)
        .await
        .map_err(|e| {
            error!("Failed to compute statistics for station {}: {}", station_id, e);
            ApiError::from(e)
        })?;
    Ok(Json(statistics))
}

#[utoipa::path(
    post,
    path = "/api/v1/risk/classify",
    request_body = ClassifyRequest,
    responses((status = 200, description = "Risk level per value and overall severity", body = Classification)),
    tag = "risk"
)]
#[instrument(skip(state, request), fields(values = request.values.len()))]
async fn classify_risk(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Json<Classification> {
    let result = state.risk_service.classify(&request.values);
    info!("Classified {} values: {:?}", result.levels.len(), result.severity);
    Json(result)
}

#[utoipa::path(
    post,
    path = "/api/v1/risk/assess",
    request_body(content = String, description = "Sample table CSV", content_type = "text/csv"),
    responses(
        (status = 200, description = "Predicted ODO and risk level per sample", body = RiskAssessment),
        (status = 422, description = "Required column missing", body = ErrorResponse),
        (status = 503, description = "ODO model artifact not available", body = ErrorResponse)
    ),
    tag = "risk"
)]
#[instrument(skip(state, body), fields(size = body.len()))]
async fn assess_risk(State(state): State<AppState>, body: String) -> Result<Json<RiskAssessment>, ApiError> {
    let assessment = state.risk_service.assess_csv(&body).map_err(|e| {
        error!("Risk assessment failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(assessment))
}

#[utoipa::path(
    post,
    path = "/api/v1/risk/assess.csv",
    request_body(content = String, description = "Sample table CSV", content_type = "text/csv"),
    responses(
        (status = 200, description = "Samples with Predicted ODO mg/L and Risk Level columns", body = String, content_type = "text/csv"),
        (status = 422, description = "Required column missing", body = ErrorResponse),
        (status = 503, description = "ODO model artifact not available", body = ErrorResponse)
    ),
    tag = "risk"
)]
#[instrument(skip(state, body), fields(size = body.len()))]
async fn assess_risk_csv(State(state): State<AppState>, body: String) -> Result<Response, ApiError> {
    let csv = state.risk_service.assess_csv_export(&body).map_err(|e| {
        error!("Risk assessment export failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(csv_response(csv))
}

#[utoipa::path(
    post,
    path = "/api/v1/predictions",
    request_body(content = String, description = "Sample table CSV", content_type = "text/csv"),
    responses(
        (status = 200, description = "Multi-target predictions and critical-condition counts", body = WaterQualityForecast),
        (status = 422, description = "Required column missing", body = ErrorResponse),
        (status = 503, description = "Multi-output model artifact not available", body = ErrorResponse)
    ),
    tag = "risk"
)]
#[instrument(skip(state, body), fields(size = body.len()))]
async fn predict_water_quality(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<WaterQualityForecast>, ApiError> {
    let forecast = state.risk_service.forecast_csv(&body).map_err(|e| {
        error!("Water-quality prediction failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(forecast))
}

#[utoipa::path(
    post,
    path = "/api/v1/samples/summary",
    request_body(content = String, description = "Sample table CSV", content_type = "text/csv"),
    responses(
        (status = 200, description = "Averages and monthly comparison", body = SampleSummary),
        (status = 422, description = "Required column missing", body = ErrorResponse)
    ),
    tag = "samples"
)]
#[instrument(skip(state, body), fields(size = body.len()))]
async fn summarize_samples(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<SampleSummary>, ApiError> {
    let summary = state.risk_service.summarize_csv(&body).map_err(|e| {
        warn!("Sample summary failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(summary))
}

#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/station",
    params(("session_id" = String, Path, description = "Client session id")),
    request_body = SelectStationRequest,
    responses(
        (status = 200, description = "Selected station", body = Station),
        (status = 404, description = "Station not registered", body = ErrorResponse)
    ),
    tag = "sessions"
)]
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn select_station(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectStationRequest>,
) -> Result<Json<Station>, ApiError> {
    let ctx = state.render_context(&session_id);
    let station = state
        .buoy_service
        .select_station(&ctx, &request.station_id, request.region.as_deref())
        .map_err(|e| {
            warn!("Session {} could not select {}: {}", session_id, request.station_id, e);
            ApiError::from(e)
        })?;
    info!(
        "Session {} selected station {} in {}",
        session_id, station.id, station.region
    );
    Ok(Json(station.clone()))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}/readings",
    params(("session_id" = String, Path, description = "Client session id")),
    responses(
        (status = 200, description = "Readings for the session's selected station", body = StationReadings),
        (status = 404, description = "No station selected", body = ErrorResponse),
        (status = 502, description = "NDBC feed unavailable", body = ErrorResponse)
    ),
    tag = "sessions"
)]
#[instrument(skip(state), fields(session_id = %session_id))]
async fn get_session_readings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StationReadings>, ApiError> {
    let ctx = state.render_context(&session_id);
    let readings = state.buoy_service.session_readings(&ctx).await.map_err(|e| {
        error!("Failed to fetch readings for session {}: {}", session_id, e);
        ApiError::from(e)
    })?;
    Ok(Json(readings))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_stations,
        get_station,
        get_readings,
        get_readings_csv,
        get_statistics,
        classify_risk,
        assess_risk,
        assess_risk_csv,
        predict_water_quality,
        summarize_samples,
        select_station,
        get_session_readings
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        ClassifyRequest,
        SelectStationRequest,
        Station,
        Region,
        StationReadings,
        StationStatistics,
        BuoyReading,
        ColumnStatistics,
        RiskLevel,
        RiskSummary,
        Severity,
        Classification,
        RiskAssessment,
        AssessedSample,
        WaterSample,
        WaterQualityForecast,
        PredictionTable,
        PredictedSample,
        CriticalConditions,
        TargetError,
        SampleSummary,
        SampleAverages,
        MonthlyAverage
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "stations", description = "NDBC station registry"),
        (name = "readings", description = "Real-time buoy feeds"),
        (name = "risk", description = "Dissolved-oxygen risk assessment and prediction"),
        (name = "samples", description = "Water-quality sample summaries"),
        (name = "sessions", description = "Per-session station selection")
    )
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
