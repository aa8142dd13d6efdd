use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shared::{Coordinate, PlaceSuggestion, RouteStep, TransportMode};

use crate::{
    error::RouteError,
    provider::{Directions, Journey, RouteProvider},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

const GEOCODE_SERVICE: &str = "geocode";
const AUTOCOMPLETE_SERVICE: &str = "autocomplete";
const DIRECTIONS_SERVICE: &str = "directions";
const MIN_SUGGEST_CHARS: usize = 2;

/// Directions profile; transit has none and rides on the car profile.
pub fn profile(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Driving | TransportMode::Transit => "driving-car",
        TransportMode::Cycling => "cycling-regular",
        TransportMode::Walking => "foot-walking",
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection<F> {
    #[serde(default = "Vec::new")]
    features: Vec<F>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: PlaceProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// `[lng, lat]`
    coordinates: [f64; 2],
}

#[derive(Debug, Default, Deserialize)]
struct PlaceProperties {
    name: Option<String>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    geometry: Option<LineGeometry>,
    properties: Option<RouteProperties>,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct RouteProperties {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    distance: f64,
    /// Seconds.
    duration: f64,
    #[serde(default)]
    steps: Vec<OrsStep>,
}

#[derive(Debug, Deserialize)]
struct OrsStep {
    instruction: String,
    distance: f64,
    /// Seconds.
    duration: f64,
}

fn lat_lng([lng, lat]: [f64; 2]) -> Coordinate {
    Coordinate::new(lat, lng)
}

fn lng_lat(coord: Coordinate) -> [f64; 2] {
    [coord.lon, coord.lat]
}

fn parse_geocode(body: &str, place: &str) -> Result<Coordinate, RouteError> {
    let collection: FeatureCollection<PlaceFeature> =
        serde_json::from_str(body).map_err(|e| RouteError::malformed(GEOCODE_SERVICE, e.to_string()))?;
    collection
        .features
        .first()
        .map(|feature| lat_lng(feature.geometry.coordinates))
        .ok_or_else(|| RouteError::LocationNotFound(place.to_string()))
}

fn parse_suggestions(body: &str) -> Result<Vec<PlaceSuggestion>, RouteError> {
    let collection: FeatureCollection<PlaceFeature> = serde_json::from_str(body)
        .map_err(|e| RouteError::malformed(AUTOCOMPLETE_SERVICE, e.to_string()))?;
    Ok(collection
        .features
        .into_iter()
        .map(|feature| {
            let name = feature.properties.name.unwrap_or_default();
            let label = feature.properties.label.unwrap_or_else(|| name.clone());
            PlaceSuggestion {
                name,
                label,
                coordinate: lat_lng(feature.geometry.coordinates),
            }
        })
        .collect())
}

fn parse_directions(body: &str) -> Result<Directions, RouteError> {
    let collection: FeatureCollection<RouteFeature> = serde_json::from_str(body)
        .map_err(|e| RouteError::malformed(DIRECTIONS_SERVICE, e.to_string()))?;
    let feature = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::malformed(DIRECTIONS_SERVICE, "no route feature"))?;
    let geometry = feature
        .geometry
        .ok_or_else(|| RouteError::malformed(DIRECTIONS_SERVICE, "missing geometry"))?;
    let segment = feature
        .properties
        .and_then(|p| p.segments.into_iter().next())
        .ok_or_else(|| RouteError::malformed(DIRECTIONS_SERVICE, "missing segment data"))?;

    let directions = Directions {
        distance: segment.distance,
        duration: segment.duration / 60.0,
        coordinates: geometry.coordinates.into_iter().map(lat_lng).collect(),
        steps: segment
            .steps
            .into_iter()
            .map(|s| RouteStep {
                instruction: s.instruction,
                distance: s.distance,
                duration: s.duration / 60.0,
            })
            .collect(),
    };

    if !directions.is_usable() {
        return Err(RouteError::malformed(
            DIRECTIONS_SERVICE,
            format!("unusable geometry ({} points)", directions.coordinates.len()),
        ));
    }
    Ok(directions)
}

/// OpenRouteService client: geocoding, autocomplete and directions.
pub struct OrsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OrsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_text(
        &self,
        service: &'static str,
        path: &str,
        text: &str,
    ) -> Result<String, RouteError> {
        let res = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str()), ("text", text)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(RouteError::UpstreamStatus {
                service,
                status: status.as_u16(),
            });
        }
        Ok(res.text().await?)
    }
}

#[async_trait]
impl RouteProvider for OrsClient {
    fn name(&self) -> &'static str {
        "openrouteservice"
    }

    #[tracing::instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Coordinate, RouteError> {
        let body = self.get_text(GEOCODE_SERVICE, "/geocode/search", place).await?;
        parse_geocode(&body, place)
    }

    #[tracing::instrument(skip(self, journey), fields(start = %journey.start_label, end = %journey.end_label))]
    async fn get_route(
        &self,
        journey: &Journey,
        mode: TransportMode,
    ) -> Result<Directions, RouteError> {
        let url = format!(
            "{}/v2/directions/{}/geojson",
            self.base_url,
            profile(mode)
        );
        let body = json!({
            "coordinates": [lng_lat(journey.start), lng_lat(journey.end)],
            "format": "geojson",
        });

        let res = self
            .client
            .post(url)
            .query(&[("api_key", self.api_key.as_str())])
            .header(reqwest::header::ACCEPT, "application/json, application/geo+json")
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(RouteError::UpstreamStatus {
                service: DIRECTIONS_SERVICE,
                status: status.as_u16(),
            });
        }
        let text = res.text().await?;
        parse_directions(&text)
    }

    #[tracing::instrument(skip(self))]
    async fn suggest(&self, text: &str) -> Result<Vec<PlaceSuggestion>, RouteError> {
        if text.trim().chars().count() < MIN_SUGGEST_CHARS {
            return Ok(Vec::new());
        }
        let body = self
            .get_text(AUTOCOMPLETE_SERVICE, "/geocode/autocomplete", text)
            .await?;
        parse_suggestions(&body)
    }
}
