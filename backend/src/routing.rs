use rand::{seq::index, Rng};
use shared::{Coordinate, Route, RouteStep, TransportMode};

use crate::provider::{Directions, Journey};

const METERS_PER_DEGREE: f64 = 111_000.0;
const MINUTES_PER_KM: f64 = 5.0;
/// Full width of the noise added to intermediate points, in degrees.
const PATH_NOISE_DEG: f64 = 0.005;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

const DRIVING_INSTRUCTIONS: &[&str] = &[
    "Head west on Main Street",
    "Turn right onto Oak Avenue",
    "Continue onto Maple Boulevard",
    "Turn left onto Cedar Street",
    "Take the 2nd exit at the roundabout",
    "Merge onto Highway 101",
    "Take exit 23B for Pine Road",
    "Turn right onto River Drive",
    "Continue straight onto Mountain View Road",
    "Turn left onto Sunset Boulevard",
    "Your destination will be on the right",
];

const CYCLING_INSTRUCTIONS: &[&str] = &[
    "Head west on Main Street bike lane",
    "Turn right onto Oak Avenue",
    "Use the cycling path through Central Park",
    "Cross at the pedestrian crossing",
    "Turn left onto Cedar Street bike lane",
    "Continue onto the riverside cycling path",
    "Exit the cycling path at River Drive",
    "Turn right onto Mountain View Road",
    "Your destination will be on the right",
];

const WALKING_INSTRUCTIONS: &[&str] = &[
    "Head west on Main Street sidewalk",
    "Turn right onto Oak Avenue",
    "Walk through Central Park",
    "Cross at the pedestrian crossing",
    "Turn left onto Cedar Street",
    "Take the pedestrian bridge over the river",
    "Continue onto River Walk path",
    "Exit the path at Mountain View Road",
    "Your destination will be on the right",
];

const TRANSIT_INSTRUCTIONS: &[&str] = &[
    "Walk to Main Street bus stop",
    "Take bus #42 towards Downtown",
    "Ride for 4 stops",
    "Exit at Central Park station",
    "Walk north on Oak Avenue",
    "Take the subway Line A towards Westside",
    "Exit at River Station",
    "Walk east on River Drive for 400m",
    "Your destination will be on the right",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub points: usize,
    pub duration_factor: f64,
    pub distance_factor: f64,
}

pub fn mode_profile(mode: TransportMode) -> ModeProfile {
    let (points, duration_factor, distance_factor) = match mode {
        TransportMode::Driving => (25, 1.0, 1.0),
        TransportMode::Transit => (20, 2.0, 1.2),
        TransportMode::Cycling => (15, 3.0, 1.1),
        TransportMode::Walking => (10, 10.0, 0.9),
    };
    ModeProfile {
        points,
        duration_factor,
        distance_factor,
    }
}

pub fn instructions(mode: TransportMode) -> &'static [&'static str] {
    match mode {
        TransportMode::Driving => DRIVING_INSTRUCTIONS,
        TransportMode::Cycling => CYCLING_INSTRUCTIONS,
        TransportMode::Walking => WALKING_INSTRUCTIONS,
        TransportMode::Transit => TRANSIT_INSTRUCTIONS,
    }
}

/// Equirectangular approximation of the straight-line distance in meters.
pub fn base_distance_m(start: Coordinate, end: Coordinate) -> f64 {
    let dy = (end.lat - start.lat) * METERS_PER_DEGREE;
    let dx = (end.lon - start.lon) * METERS_PER_DEGREE * start.lat.to_radians().cos();
    (dx * dx + dy * dy).sqrt()
}

/// `points` coordinates from `start` to `end`; only the intermediate ones are perturbed.
pub fn synthesize_path<R: Rng + ?Sized>(
    start: Coordinate,
    end: Coordinate,
    points: usize,
    rng: &mut R,
) -> Vec<Coordinate> {
    let points = points.max(2);
    let mut path = Vec::with_capacity(points);
    path.push(start);

    let last = (points - 1) as f64;
    for i in 1..points - 1 {
        let mut point = start.interpolate(end, i as f64 / last);
        point.lat += (rng.random::<f64>() - 0.5) * PATH_NOISE_DEG;
        point.lon += (rng.random::<f64>() - 0.5) * PATH_NOISE_DEG;
        path.push(point);
    }

    path.push(end);
    path
}

pub fn synthesize_steps<R: Rng + ?Sized>(
    mode: TransportMode,
    points: usize,
    rng: &mut R,
) -> Vec<RouteStep> {
    let list = instructions(mode);
    let count = (points / 2).max(3).min(list.len());

    let mut middle = index::sample(rng, list.len() - 2, count - 2).into_vec();
    middle.sort_unstable();

    let mut steps = Vec::with_capacity(count);
    steps.push(step(list[0], rng.random_range(200..=699), rng.random_range(1..=3)));
    for idx in middle {
        steps.push(step(
            list[idx + 1],
            rng.random_range(300..=1299),
            rng.random_range(2..=6),
        ));
    }
    steps.push(step(
        list[list.len() - 1],
        rng.random_range(100..=399),
        rng.random_range(1..=2),
    ));
    steps
}

fn step(instruction: &str, distance: u32, duration: u32) -> RouteStep {
    RouteStep {
        instruction: instruction.to_string(),
        distance: f64::from(distance),
        duration: f64::from(duration),
    }
}

/// Straight interpolation with a little noise and a canned step list. Step
/// distances are not derived from the path and do not add up to the total.
pub fn synthesize_directions<R: Rng + ?Sized>(
    start: Coordinate,
    end: Coordinate,
    mode: TransportMode,
    rng: &mut R,
) -> Directions {
    let profile = mode_profile(mode);

    let distance =
        base_distance_m(start, end) * profile.distance_factor * rng.random_range(0.9..=1.1);
    let duration = (distance / 1000.0)
        * profile.duration_factor
        * MINUTES_PER_KM
        * rng.random_range(0.9..=1.1);

    Directions {
        distance,
        duration,
        coordinates: synthesize_path(start, end, profile.points, rng),
        steps: synthesize_steps(mode, profile.points, rng),
    }
}

/// Complete synthetic route between two resolved endpoints.
pub fn synthesize_route<R: Rng + ?Sized>(
    journey: &Journey,
    mode: TransportMode,
    rng: &mut R,
) -> Route {
    let directions = synthesize_directions(journey.start, journey.end, mode, rng);
    directions.into_route(route_id(mode, rng), mode, journey)
}

/// `"{mode}-{suffix}"`, unique per mode within one result set.
pub fn route_id<R: Rng + ?Sized>(mode: TransportMode, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{mode}-{suffix}")
}
