pub mod config;
pub mod emissions;
pub mod engine;
pub mod error;
pub mod geocode;
pub mod gpx_export;
pub mod models;
pub mod ors;
pub mod provider;
pub mod routing;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::emissions::{compare_emissions, emission_rate_for_label, summarize_trips};
use crate::engine::RouteEngine;
use crate::error::RouteError;
use crate::gpx_export::encode_route_as_gpx;
use crate::models::{
    ApiError, EmissionsQuery, EmissionsResponse, GeocodeResponse, GpxExportResponse,
    PlaceSuggestion, Route, RouteMetadata, RouteQuery, RoutesResponse, TextQuery,
    TripRecord, TripSummary,
};
use crate::ors::OrsClient;
use crate::provider::{RouteProvider, SyntheticProvider};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RouteEngine>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Builds the engine described by `config`: the live client when a key is set,
/// the synthetic provider as fallback.
pub fn build_engine(config: &Config) -> RouteEngine {
    let primary: Option<Arc<dyn RouteProvider>> = match config.api_key() {
        Some(key) => Some(Arc::new(OrsClient::with_base_url(key, &config.ors_base_url))),
        None => {
            tracing::warn!("ORS_API_KEY not set, serving synthesized routes only");
            None
        }
    };
    let fallback = match config.seed {
        Some(seed) => SyntheticProvider::seeded(seed),
        None => SyntheticProvider::new(),
    };
    let engine = RouteEngine::new(primary, Arc::new(fallback), config.failure_policy);
    match config.seed {
        Some(seed) => engine.with_seed(seed),
        None => engine,
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/routes", post(routes_handler))
        .route("/api/routes/gpx", post(gpx_handler))
        .route("/api/geocode", get(geocode_handler))
        .route("/api/suggest", get(suggest_handler))
        .route("/api/emissions", get(emissions_handler))
        .route("/api/summary", post(summary_handler))
        .layer(cors)
        .with_state(state)
}

async fn routes_handler(
    State(state): State<AppState>,
    req: Result<Json<RouteQuery>, JsonRejection>,
) -> ApiResult<RoutesResponse> {
    let Json(req) = req.map_err(|e| api_error(e.into()))?;
    let mode = req.transport_mode().map_err(api_error)?;
    let routes = state
        .engine
        .get_routes(&req.start, &req.end, mode)
        .await
        .map_err(api_error)?;

    if routes.is_empty() {
        return Err(api_error(RouteError::NoRoutes));
    }

    let comparison = compare_emissions(&routes);
    let metadata = RouteMetadata::from_routes(&routes);
    Ok(Json(RoutesResponse {
        routes,
        comparison,
        metadata,
    }))
}

async fn geocode_handler(
    State(state): State<AppState>,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> ApiResult<GeocodeResponse> {
    let Query(query) = query.map_err(|e| api_error(e.into()))?;
    let coordinate = state.engine.geocode(&query.text).await.map_err(api_error)?;
    Ok(Json(GeocodeResponse {
        text: query.text,
        coordinate,
    }))
}

async fn suggest_handler(
    State(state): State<AppState>,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> ApiResult<Vec<PlaceSuggestion>> {
    let Query(query) = query.map_err(|e| api_error(e.into()))?;
    Ok(Json(state.engine.suggest(&query.text).await))
}

async fn emissions_handler(
    query: Result<Query<EmissionsQuery>, QueryRejection>,
) -> ApiResult<EmissionsResponse> {
    let Query(query) = query.map_err(|e| api_error(e.into()))?;
    if !query.distance.is_finite() || query.distance < 0.0 {
        return Err(api_error(RouteError::InvalidRequest(
            "distance must be a non-negative number of meters".into(),
        )));
    }
    let emissions = emission_rate_for_label(&query.mode) * (query.distance / 1000.0);
    Ok(Json(EmissionsResponse {
        mode: query.mode,
        distance: query.distance,
        emissions,
    }))
}

async fn summary_handler(
    trips: Result<Json<Vec<TripRecord>>, JsonRejection>,
) -> ApiResult<TripSummary> {
    let Json(trips) = trips.map_err(|e| api_error(e.into()))?;
    Ok(Json(summarize_trips(&trips)))
}

async fn gpx_handler(route: Result<Json<Route>, JsonRejection>) -> ApiResult<GpxExportResponse> {
    let Json(route) = route.map_err(|e| api_error(e.into()))?;
    let gpx_base64 = encode_route_as_gpx(&route).map_err(api_error)?;
    Ok(Json(GpxExportResponse { gpx_base64 }))
}

fn api_error(err: RouteError) -> (StatusCode, Json<ApiError>) {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
