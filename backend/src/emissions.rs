use shared::{EmissionBar, ModeShare, Route, TransportMode, TripRecord, TripSummary};

/// Average passenger car emissions, used to value zero-emission trips.
pub const CAR_KG_PER_KM: f64 = 0.12;

const MIN_BAR_SCALE: f64 = 0.1;
const ZERO_BAR_WIDTH: f64 = 3.0;

/// Kilograms of CO₂ per kilometre.
pub fn emission_rate(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Driving => CAR_KG_PER_KM,
        TransportMode::Transit => 0.03,
        TransportMode::Cycling | TransportMode::Walking => 0.0,
    }
}

/// Rate for a free-text mode label; anything unrecognised is billed as driving.
pub fn emission_rate_for_label(label: &str) -> f64 {
    label
        .parse::<TransportMode>()
        .map(emission_rate)
        .unwrap_or(CAR_KG_PER_KM)
}

pub fn estimate_emissions(mode: TransportMode, distance_m: f64) -> f64 {
    emission_rate(mode) * (distance_m / 1000.0)
}

/// Bars for the emissions chart, lowest emitter first.
pub fn compare_emissions(routes: &[Route]) -> Vec<EmissionBar> {
    let scale = routes
        .iter()
        .map(|r| r.emissions)
        .fold(MIN_BAR_SCALE, f64::max);

    let mut bars: Vec<EmissionBar> = routes
        .iter()
        .map(|route| {
            let percent_width = if route.emissions == 0.0 {
                ZERO_BAR_WIDTH
            } else {
                route.emissions / scale * 100.0
            };
            EmissionBar {
                route_id: route.id.clone(),
                transport_mode: route.transport_mode,
                emissions: route.emissions,
                percent_width,
            }
        })
        .collect();
    bars.sort_by(|a, b| a.emissions.total_cmp(&b.emissions));
    bars
}

pub fn summarize_trips(trips: &[TripRecord]) -> TripSummary {
    let total_distance_km: f64 = trips.iter().map(|t| t.distance_km).sum();
    let total_emissions_kg: f64 = trips.iter().map(|t| t.emissions_kg).sum();

    let emitting: Vec<&TripRecord> = trips
        .iter()
        .filter(|t| t.emissions_kg > 0.0 && t.distance_km > 0.0)
        .collect();
    let avg_emissions_per_km = if emitting.is_empty() {
        0.0
    } else {
        emitting
            .iter()
            .map(|t| t.emissions_kg / t.distance_km)
            .sum::<f64>()
            / emitting.len() as f64
    };

    let zero_emission_km: f64 = trips
        .iter()
        .filter(|t| t.emissions_kg == 0.0)
        .map(|t| t.distance_km)
        .sum();
    let emissions_saved_kg = zero_emission_km * CAR_KG_PER_KM;

    let denominator = total_emissions_kg + emissions_saved_kg;
    let eco_score = if denominator > 0.0 {
        ((emissions_saved_kg / denominator) * 100.0).round().min(100.0) as u32
    } else {
        0
    };

    let mut distribution: Vec<ModeShare> = Vec::new();
    for trip in trips {
        match distribution
            .iter_mut()
            .find(|share| share.transport_mode == trip.transport_mode)
        {
            Some(share) => share.distance_km += trip.distance_km,
            None => distribution.push(ModeShare {
                transport_mode: trip.transport_mode,
                distance_km: trip.distance_km,
            }),
        }
    }

    TripSummary {
        total_distance_km,
        total_emissions_kg,
        avg_emissions_per_km,
        emissions_saved_kg,
        eco_score,
        distribution,
    }
}
