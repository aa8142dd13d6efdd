use std::sync::{Arc, Mutex};

use futures::future::join_all;
use rand::{rngs::StdRng, SeedableRng};
use shared::{Coordinate, PlaceSuggestion, Route, TransportMode};

use crate::{
    error::RouteError,
    provider::{Directions, Journey, RouteProvider, SyntheticProvider},
    routing::route_id,
};

const ID_SEED_OFFSET: u64 = 1;

/// What to do when the primary provider cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Failed modes are dropped; geocoding errors are returned as-is.
    Strict,
    /// Failed modes are replaced by synthesized routes.
    #[default]
    Substitute,
    /// Failed modes are dropped unless all of them failed, in which case the
    /// whole set is synthesized.
    Batch,
}

impl FailurePolicy {
    pub fn geocode_fallback(self) -> bool {
        !matches!(self, FailurePolicy::Strict)
    }
}

/// Where a mode's route comes from once the policy has looked at the outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteSource {
    Provider(Directions),
    Synthesized,
}

/// Decides, per mode, which primary results are kept and which get synthesized.
pub fn resolve_outcomes(
    policy: FailurePolicy,
    outcomes: Vec<(TransportMode, Result<Directions, RouteError>)>,
) -> Result<Vec<(TransportMode, RouteSource)>, RouteError> {
    let outcomes: Vec<(TransportMode, Result<Directions, RouteError>)> = outcomes
        .into_iter()
        .map(|(mode, result)| {
            let result = result.and_then(|d| {
                if d.is_usable() {
                    Ok(d)
                } else {
                    Err(RouteError::malformed("directions", "unusable geometry"))
                }
            });
            if let Err(err) = &result {
                tracing::warn!(%mode, error = %err, "directions unavailable");
            }
            (mode, result)
        })
        .collect();

    match policy {
        FailurePolicy::Substitute => Ok(outcomes
            .into_iter()
            .map(|(mode, result)| match result {
                Ok(d) => (mode, RouteSource::Provider(d)),
                Err(_) => (mode, RouteSource::Synthesized),
            })
            .collect()),
        FailurePolicy::Strict | FailurePolicy::Batch => {
            let modes: Vec<TransportMode> = outcomes.iter().map(|(mode, _)| *mode).collect();
            let kept: Vec<(TransportMode, RouteSource)> = outcomes
                .into_iter()
                .filter_map(|(mode, result)| result.ok().map(|d| (mode, RouteSource::Provider(d))))
                .collect();

            if !kept.is_empty() {
                Ok(kept)
            } else if policy == FailurePolicy::Batch {
                tracing::warn!("no usable directions, synthesizing the full set");
                Ok(modes
                    .into_iter()
                    .map(|mode| (mode, RouteSource::Synthesized))
                    .collect())
            } else {
                Err(RouteError::NoRoutes)
            }
        }
    }
}

pub fn requested_modes(mode: Option<TransportMode>) -> Vec<TransportMode> {
    match mode {
        Some(mode) => vec![mode],
        None => TransportMode::DEFAULT_SEARCH.to_vec(),
    }
}

/// Coordinates the primary provider, the fallback provider and the failure policy.
pub struct RouteEngine {
    primary: Option<Arc<dyn RouteProvider>>,
    fallback: Arc<dyn RouteProvider>,
    policy: FailurePolicy,
    rng: Mutex<StdRng>,
}

impl RouteEngine {
    pub fn new(
        primary: Option<Arc<dyn RouteProvider>>,
        fallback: Arc<dyn RouteProvider>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            primary,
            fallback,
            policy,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Engine with no live provider; every answer comes from the synthetic one.
    pub fn fallback_only(seed: Option<u64>) -> Self {
        let fallback = match seed {
            Some(seed) => SyntheticProvider::seeded(seed),
            None => SyntheticProvider::new(),
        };
        let engine = Self::new(None, Arc::new(fallback), FailurePolicy::Substitute);
        match seed {
            Some(seed) => engine.with_seed(seed),
            None => engine,
        }
    }

    /// Seeds route ids. The id stream is offset from `seed` so a synthetic
    /// provider given the same seed draws different numbers.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed.wrapping_add(ID_SEED_OFFSET))),
            ..self
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    fn primary(&self) -> Result<&Arc<dyn RouteProvider>, RouteError> {
        self.primary.as_ref().ok_or(RouteError::MissingApiKey)
    }

    #[tracing::instrument(skip(self))]
    pub async fn geocode(&self, place: &str) -> Result<Coordinate, RouteError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(RouteError::EmptyLocation);
        }

        let primary = match self.primary() {
            Ok(provider) => provider.geocode(place).await,
            Err(err) => Err(err),
        };
        match primary {
            Ok(coord) => Ok(coord),
            Err(err) if self.policy.geocode_fallback() => {
                tracing::warn!(error = %err, provider = self.fallback.name(), "geocoding fell back");
                self.fallback.geocode(place).await
            }
            Err(err) => Err(err),
        }
    }

    async fn primary_route(
        &self,
        journey: &Journey,
        mode: TransportMode,
    ) -> Result<Directions, RouteError> {
        self.primary()?.get_route(journey, mode).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_routes(
        &self,
        start: &str,
        end: &str,
        mode: Option<TransportMode>,
    ) -> Result<Vec<Route>, RouteError> {
        let (start_coords, end_coords) = tokio::try_join!(self.geocode(start), self.geocode(end))?;
        let journey = Journey {
            start: start_coords,
            end: end_coords,
            start_label: start.to_string(),
            end_label: end.to_string(),
        };

        let modes = requested_modes(mode);
        let outcomes = join_all(modes.iter().map(|&mode| {
            let journey = &journey;
            async move { (mode, self.primary_route(journey, mode).await) }
        }))
        .await;

        let plan = resolve_outcomes(self.policy, outcomes)?;

        let mut routes = Vec::with_capacity(plan.len());
        for (mode, source) in plan {
            let directions = match source {
                RouteSource::Provider(directions) => directions,
                RouteSource::Synthesized => self.fallback.get_route(&journey, mode).await?,
            };
            let id = self.next_id(mode);
            routes.push(directions.into_route(id, mode, &journey));
        }

        tracing::info!(count = routes.len(), "routes ready");
        Ok(routes)
    }

    /// Suggestions never fail; the fallback list is used when the primary errors.
    #[tracing::instrument(skip(self))]
    pub async fn suggest(&self, text: &str) -> Vec<PlaceSuggestion> {
        let primary = match self.primary() {
            Ok(provider) => provider.suggest(text).await,
            Err(err) => Err(err),
        };
        match primary {
            Ok(suggestions) => suggestions,
            Err(err) => {
                tracing::debug!(error = %err, "suggestions fell back");
                self.fallback.suggest(text).await.unwrap_or_default()
            }
        }
    }

    fn next_id(&self, mode: TransportMode) -> String {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        route_id(mode, &mut *rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// Live-provider stand-in that fails for a chosen set of modes.
    struct ScriptedProvider {
        failing: Vec<TransportMode>,
        geocode_fails: bool,
    }

    #[async_trait]
    impl RouteProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn geocode(&self, place: &str) -> Result<Coordinate, RouteError> {
            if self.geocode_fails {
                return Err(RouteError::LocationNotFound(place.to_string()));
            }
            Ok(Coordinate::new(10.0, 20.0))
        }

        async fn get_route(
            &self,
            journey: &Journey,
            mode: TransportMode,
        ) -> Result<Directions, RouteError> {
            if self.failing.contains(&mode) {
                return Err(RouteError::UpstreamStatus {
                    service: "directions",
                    status: 500,
                });
            }
            Ok(Directions {
                distance: 5000.0,
                duration: 12.0,
                coordinates: vec![journey.start, journey.end],
                steps: Vec::new(),
            })
        }

        async fn suggest(&self, _text: &str) -> Result<Vec<PlaceSuggestion>, RouteError> {
            Err(RouteError::UpstreamStatus {
                service: "autocomplete",
                status: 503,
            })
        }
    }

    fn engine(failing: &[TransportMode], policy: FailurePolicy) -> RouteEngine {
        let primary = ScriptedProvider {
            failing: failing.to_vec(),
            geocode_fails: false,
        };
        RouteEngine::new(
            Some(Arc::new(primary)),
            Arc::new(SyntheticProvider::seeded(7)),
            policy,
        )
        .with_seed(7)
    }

    fn modes(routes: &[Route]) -> Vec<TransportMode> {
        routes.iter().map(|r| r.transport_mode).collect()
    }

    fn ok(distance: f64) -> Result<Directions, RouteError> {
        Ok(Directions {
            distance,
            duration: 1.0,
            coordinates: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
            steps: Vec::new(),
        })
    }

    fn failed() -> Result<Directions, RouteError> {
        Err(RouteError::NoRoutes)
    }

    #[test]
    fn strict_policy_drops_failed_modes() {
        let plan = resolve_outcomes(
            FailurePolicy::Strict,
            vec![(TransportMode::Driving, ok(1.0)), (TransportMode::Cycling, failed())],
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0, TransportMode::Driving);
    }

    #[test]
    fn strict_policy_with_nothing_left_is_an_error() {
        let err = resolve_outcomes(FailurePolicy::Strict, vec![(TransportMode::Walking, failed())])
            .unwrap_err();
        assert_eq!(err.to_string(), "No routes found");
    }

    #[test]
    fn batch_policy_synthesizes_everything_when_all_fail() {
        let plan = resolve_outcomes(
            FailurePolicy::Batch,
            vec![(TransportMode::Driving, failed()), (TransportMode::Walking, failed())],
        )
        .unwrap();
        assert_eq!(
            plan,
            vec![
                (TransportMode::Driving, RouteSource::Synthesized),
                (TransportMode::Walking, RouteSource::Synthesized),
            ]
        );
    }

    #[test]
    fn batch_policy_keeps_partial_success() {
        let plan = resolve_outcomes(
            FailurePolicy::Batch,
            vec![(TransportMode::Driving, failed()), (TransportMode::Walking, ok(2.0))],
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0, TransportMode::Walking);
    }

    #[test]
    fn unusable_directions_count_as_failures() {
        let single_point = Ok(Directions {
            distance: 1.0,
            duration: 1.0,
            coordinates: vec![Coordinate::new(0.0, 0.0)],
            steps: Vec::new(),
        });
        let plan = resolve_outcomes(
            FailurePolicy::Substitute,
            vec![(TransportMode::Driving, single_point)],
        )
        .unwrap();
        assert_eq!(plan[0].1, RouteSource::Synthesized);
    }

    #[tokio::test]
    async fn default_search_returns_one_route_per_default_mode() {
        let routes = engine(&[], FailurePolicy::Strict)
            .get_routes("A", "B", None)
            .await
            .unwrap();
        assert_eq!(
            modes(&routes),
            [TransportMode::Driving, TransportMode::Cycling, TransportMode::Walking]
        );
        let ids: HashSet<_> = routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), routes.len());
        for route in &routes {
            assert_eq!(route.is_eco_friendly, route.transport_mode.is_eco_friendly());
        }
    }

    #[tokio::test]
    async fn strict_search_drops_failing_cycling() {
        let routes = engine(&[TransportMode::Cycling], FailurePolicy::Strict)
            .get_routes("A", "B", None)
            .await
            .unwrap();
        assert_eq!(modes(&routes), [TransportMode::Driving, TransportMode::Walking]);
    }

    #[tokio::test]
    async fn substitute_search_synthesizes_failing_cycling() {
        let routes = engine(&[TransportMode::Cycling], FailurePolicy::Substitute)
            .get_routes("A", "B", None)
            .await
            .unwrap();
        assert_eq!(
            modes(&routes),
            [TransportMode::Driving, TransportMode::Cycling, TransportMode::Walking]
        );
        // Scripted routes have two points; the synthesized cycling one has fifteen.
        assert_eq!(routes[0].coordinates.len(), 2);
        assert_eq!(routes[1].coordinates.len(), 15);
        assert_eq!(routes[1].emissions, 0.0);
    }

    #[tokio::test]
    async fn strict_search_with_all_modes_failing_errors() {
        let err = engine(&TransportMode::ALL, FailurePolicy::Strict)
            .get_routes("A", "B", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::NoRoutes));
    }

    #[tokio::test]
    async fn transit_is_served_when_requested() {
        let routes = engine(&[], FailurePolicy::Strict)
            .get_routes("A", "B", Some(TransportMode::Transit))
            .await
            .unwrap();
        assert_eq!(modes(&routes), [TransportMode::Transit]);
        assert!((routes[0].emissions - 0.15).abs() < 1e-12);
    }

    #[tokio::test]
    async fn fallback_only_london_to_manchester() {
        let routes = RouteEngine::fallback_only(Some(42))
            .get_routes("London", "Manchester", Some(TransportMode::Driving))
            .await
            .unwrap();
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.transport_mode, TransportMode::Driving);
        assert_eq!(route.coordinates.len(), 25);
        assert_eq!(route.coordinates[0], Coordinate::new(51.5074, -0.1278));
        assert_eq!(route.coordinates[24], Coordinate::new(53.4808, -2.2426));
        assert!((route.emissions - 0.12 * route.distance / 1000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn strict_geocoding_failure_propagates() {
        let primary = ScriptedProvider {
            failing: Vec::new(),
            geocode_fails: true,
        };
        let engine = RouteEngine::new(
            Some(Arc::new(primary)),
            Arc::new(SyntheticProvider::seeded(1)),
            FailurePolicy::Strict,
        );
        let err = engine.get_routes("Nowhere", "London", None).await.unwrap_err();
        assert!(matches!(err, RouteError::LocationNotFound(_)));
    }

    #[tokio::test]
    async fn fallback_geocoding_uses_city_table() {
        let primary = ScriptedProvider {
            failing: Vec::new(),
            geocode_fails: true,
        };
        let engine = RouteEngine::new(
            Some(Arc::new(primary)),
            Arc::new(SyntheticProvider::seeded(1)),
            FailurePolicy::Substitute,
        );
        let coord = engine.geocode("london").await.unwrap();
        assert_eq!(coord, Coordinate::new(51.5074, -0.1278));
    }

    #[test]
    fn id_stream_differs_from_provider_stream() {
        let engine = RouteEngine::fallback_only(Some(9));
        let same_seed = route_id(TransportMode::Driving, &mut StdRng::seed_from_u64(9));
        let offset_seed = route_id(TransportMode::Driving, &mut StdRng::seed_from_u64(10));
        let id = engine.next_id(TransportMode::Driving);
        assert_ne!(id, same_seed);
        assert_eq!(id, offset_seed);
    }

    #[tokio::test]
    async fn empty_location_is_rejected() {
        let err = RouteEngine::fallback_only(Some(1))
            .geocode("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::EmptyLocation));
    }

    #[tokio::test]
    async fn missing_key_in_strict_mode_is_reported() {
        let engine = RouteEngine::new(
            None,
            Arc::new(SyntheticProvider::seeded(1)),
            FailurePolicy::Strict,
        );
        let err = engine.geocode("London").await.unwrap_err();
        assert!(matches!(err, RouteError::MissingApiKey));
    }

    #[tokio::test]
    async fn suggestions_fall_back_to_table() {
        let suggestions = engine(&[], FailurePolicy::Strict).suggest("lon").await;
        assert_eq!(suggestions[0].name, "London");
    }
}
