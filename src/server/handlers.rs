use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::location::{LocationResolver, Resolve, ResolvedLocation};
use crate::offices::OfficeRecord;
use crate::report::{markers, Marker, NearestResponse, DEFAULT_TOP_N};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─── GET /api/offices ────────────────────────────────────────────

pub async fn office_list(State(state): State<Arc<AppState>>) -> Json<&'static [OfficeRecord]> {
    Json(state.registry.offices())
}

// ─── GET /api/offices/{code} ─────────────────────────────────────

pub async fn office_by_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<OfficeRecord>, ApiError> {
    state
        .registry
        .get(&code)
        .map(|o| Json(*o))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Unknown office code '{}'", code)))
}

// ─── Query resolution ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocateQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub limit: Option<usize>,
}

fn resolve_params(state: &AppState, params: &LocateQuery) -> Result<ResolvedLocation, ApiError> {
    match (params.lat, params.lon, params.city.as_deref()) {
        (Some(lat), Some(lon), _) => LocationResolver::from_manual(lat, lon)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string())),
        (None, None, city) => {
            let mut resolver = state
                .resolver
                .lock()
                .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "resolver unavailable"))?;
            resolver
                .resolve(city.unwrap_or(""))
                .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))
        }
        _ => Err(api_error(
            StatusCode::BAD_REQUEST,
            "Provide both 'lat' and 'lon', or 'city'",
        )),
    }
}

// ─── GET /api/nearest ────────────────────────────────────────────

pub async fn nearest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQuery>,
) -> Result<Json<NearestResponse>, ApiError> {
    let start = Instant::now();

    let resolved = resolve_params(&state, &params)?;

    let limit = params.limit.unwrap_or(DEFAULT_TOP_N);
    if limit == 0 {
        return Err(api_error(StatusCode::BAD_REQUEST, "'limit' must be at least 1"));
    }

    let ranked = state
        .registry
        .rank(resolved.coordinate)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(
        query = %resolved.name,
        source = %resolved.source,
        nearest = ranked[0].office.code,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/nearest"
    );

    Ok(Json(NearestResponse::new(resolved, &ranked, limit)))
}

// ─── GET /api/markers ────────────────────────────────────────────

/// One pin per office, nearest first, for map clients.
pub async fn office_markers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQuery>,
) -> Result<Json<Vec<Marker>>, ApiError> {
    let resolved = resolve_params(&state, &params)?;
    let ranked = state
        .registry
        .rank(resolved.coordinate)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(query = %resolved.name, source = %resolved.source, "GET /api/markers");

    Ok(Json(markers(&ranked)))
}
