use serde::{Deserialize, Serialize};

use crate::error::RouteError;

pub use shared::{
    ApiError, Coordinate, EmissionBar, PlaceSuggestion, Route, RouteMetadata, RouteSearchRequest,
    RoutesResponse, TransportMode, TripRecord, TripSummary,
};

/// Body of `POST /api/routes`; the mode stays text until the handler parses it
/// so an unknown label is reported as a bad request.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub mode: Option<String>,
}

impl RouteQuery {
    pub fn transport_mode(&self) -> Result<Option<TransportMode>, RouteError> {
        match self.mode.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label
                .parse()
                .map(Some)
                .map_err(|_| RouteError::UnknownMode(label.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub text: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Deserialize)]
pub struct EmissionsQuery {
    #[serde(default)]
    pub mode: String,
    /// Meters.
    pub distance: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmissionsResponse {
    pub mode: String,
    pub distance: f64,
    pub emissions: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpxExportResponse {
    pub gpx_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(mode: Option<&str>) -> RouteQuery {
        RouteQuery {
            start: "A".into(),
            end: "B".into(),
            mode: mode.map(String::from),
        }
    }

    #[test]
    fn blank_mode_means_all_defaults() {
        assert_eq!(query(None).transport_mode().unwrap(), None);
        assert_eq!(query(Some(" ")).transport_mode().unwrap(), None);
    }

    #[test]
    fn mode_labels_are_parsed() {
        assert_eq!(
            query(Some("Cycling")).transport_mode().unwrap(),
            Some(TransportMode::Cycling)
        );
        assert!(matches!(
            query(Some("rocket")).transport_mode(),
            Err(RouteError::UnknownMode(label)) if label == "rocket"
        ));
    }
}
