use std::sync::Mutex;

use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};
use shared::{Coordinate, PlaceSuggestion, Route, RouteStep, TransportMode};

use crate::{
    emissions::estimate_emissions,
    error::RouteError,
    geocode::{offline_geocode, table_suggestions},
    routing::synthesize_directions,
};

/// Two resolved endpoints plus the text the user typed for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub start: Coordinate,
    pub end: Coordinate,
    pub start_label: String,
    pub end_label: String,
}

/// What a provider knows about one mode's path, before emissions and ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    /// Meters.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
    pub coordinates: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
}

impl Directions {
    pub fn is_usable(&self) -> bool {
        self.coordinates.len() >= 2
            && self.coordinates.iter().all(Coordinate::is_finite)
            && self.distance.is_finite()
            && self.distance >= 0.0
            && self.duration.is_finite()
            && self.duration >= 0.0
    }

    pub fn into_route(self, id: String, mode: TransportMode, journey: &Journey) -> Route {
        Route {
            id,
            transport_mode: mode,
            distance: self.distance,
            duration: self.duration,
            emissions: estimate_emissions(mode, self.distance),
            coordinates: self.coordinates,
            start_coords: journey.start,
            end_coords: journey.end,
            start_location: journey.start_label.clone(),
            end_location: journey.end_label.clone(),
            steps: self.steps,
            is_eco_friendly: mode.is_eco_friendly(),
        }
    }
}

/// A source of coordinates and directions.
///
/// The engine talks to a primary implementation (the live API) and falls back
/// to a second one when the first fails, so both sides share this interface.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn geocode(&self, place: &str) -> Result<Coordinate, RouteError>;

    async fn get_route(
        &self,
        journey: &Journey,
        mode: TransportMode,
    ) -> Result<Directions, RouteError>;

    async fn suggest(&self, text: &str) -> Result<Vec<PlaceSuggestion>, RouteError>;
}

/// Offline provider: city table geocoding and synthesized routes. Never fails.
pub struct SyntheticProvider {
    rng: Mutex<StdRng>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn geocode(&self, place: &str) -> Result<Coordinate, RouteError> {
        Ok(self.with_rng(|rng| offline_geocode(place, rng)))
    }

    async fn get_route(
        &self,
        journey: &Journey,
        mode: TransportMode,
    ) -> Result<Directions, RouteError> {
        tracing::debug!(%mode, "synthesizing route");
        Ok(self.with_rng(|rng| synthesize_directions(journey.start, journey.end, mode, rng)))
    }

    async fn suggest(&self, text: &str) -> Result<Vec<PlaceSuggestion>, RouteError> {
        Ok(table_suggestions(text))
    }
}
