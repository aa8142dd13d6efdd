use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod display;
pub mod state;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Driving,
    Cycling,
    Walking,
    Transit,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Driving,
        TransportMode::Cycling,
        TransportMode::Walking,
        TransportMode::Transit,
    ];

    /// Modes compared when a search does not name one.
    pub const DEFAULT_SEARCH: [TransportMode; 3] = [
        TransportMode::Driving,
        TransportMode::Cycling,
        TransportMode::Walking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Driving => "driving",
            TransportMode::Cycling => "cycling",
            TransportMode::Walking => "walking",
            TransportMode::Transit => "transit",
        }
    }

    /// Zero direct emissions.
    pub fn is_eco_friendly(self) -> bool {
        matches!(self, TransportMode::Cycling | TransportMode::Walking)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransportMode(pub String);

impl fmt::Display for UnknownTransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transport mode: {}", self.0)
    }
}

impl std::error::Error for UnknownTransportMode {}

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| UnknownTransportMode(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    /// Meters.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
}

/// One candidate path for a single transport mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub transport_mode: TransportMode,
    /// Meters.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
    /// Kilograms of CO₂.
    pub emissions: f64,
    pub coordinates: Vec<Coordinate>,
    pub start_coords: Coordinate,
    pub end_coords: Coordinate,
    pub start_location: String,
    pub end_location: String,
    pub steps: Vec<RouteStep>,
    pub is_eco_friendly: bool,
}

impl Route {
    /// Point the map centers on: the middle of the path.
    pub fn midpoint(&self) -> Option<Coordinate> {
        self.coordinates.get(self.coordinates.len() / 2).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSearchRequest {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TransportMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RouteBounds {
    pub fn from_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = coords.into_iter().filter(|c| c.is_finite());
        let first = iter.next()?;
        let init = RouteBounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        Some(iter.fold(init, |b, c| RouteBounds {
            min_lat: b.min_lat.min(c.lat),
            max_lat: b.max_lat.max(c.lat),
            min_lon: b.min_lon.min(c.lon),
            max_lon: b.max_lon.max(c.lon),
        }))
    }
}

/// Viewport hints derived from a result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub route_count: usize,
    pub center: Coordinate,
    pub bounds: RouteBounds,
    pub start: Coordinate,
    pub end: Coordinate,
}

impl RouteMetadata {
    pub fn from_routes(routes: &[Route]) -> Option<Self> {
        let first = routes.first()?;
        let bounds = RouteBounds::from_coordinates(routes.iter().flat_map(|r| &r.coordinates))?;
        Some(Self {
            route_count: routes.len(),
            center: first.midpoint()?,
            bounds,
            start: first.start_coords,
            end: first.end_coords,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionBar {
    pub route_id: String,
    pub transport_mode: TransportMode,
    pub emissions: f64,
    pub percent_width: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesResponse {
    pub routes: Vec<Route>,
    pub comparison: Vec<EmissionBar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RouteMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub name: String,
    pub label: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub transport_mode: TransportMode,
    pub distance_km: f64,
    pub emissions_kg: f64,
}

impl From<&Route> for TripRecord {
    fn from(route: &Route) -> Self {
        Self {
            transport_mode: route.transport_mode,
            distance_km: route.distance / 1000.0,
            emissions_kg: route.emissions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeShare {
    pub transport_mode: TransportMode,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub total_distance_km: f64,
    pub total_emissions_kg: f64,
    pub avg_emissions_per_km: f64,
    pub emissions_saved_kg: f64,
    pub eco_score: u32,
    pub distribution: Vec<ModeShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
