use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("OpenRouteService API key is not configured (set ORS_API_KEY)")]
    MissingApiKey,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("No results found for location: {0}")]
    LocationNotFound(String),
    #[error("unknown transport mode: {0}")]
    UnknownMode(String),
    #[error("{service} request failed with status {status}")]
    UpstreamStatus { service: &'static str, status: u16 },
    #[error("malformed {service} response: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },
    #[error("request to routing provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("No routes found")]
    NoRoutes,
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}

impl RouteError {
    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        RouteError::MalformedResponse {
            service,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::InvalidRequest(_)
            | RouteError::EmptyLocation
            | RouteError::UnknownMode(_) => StatusCode::BAD_REQUEST,
            RouteError::LocationNotFound(_) | RouteError::NoRoutes => StatusCode::NOT_FOUND,
            RouteError::UpstreamStatus { .. }
            | RouteError::MalformedResponse { .. }
            | RouteError::Http(_) => StatusCode::BAD_GATEWAY,
            RouteError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            RouteError::Gpx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        RouteError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for RouteError {
    fn from(rejection: QueryRejection) -> Self {
        RouteError::InvalidRequest(rejection.body_text())
    }
}
