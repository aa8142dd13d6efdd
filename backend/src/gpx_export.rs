use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use shared::{Coordinate, Route};

use crate::error::RouteError;

const CREATOR: &str = "greenroute";

/// GPX 1.1 document for one route, base64 encoded.
pub fn encode_route_as_gpx(route: &Route) -> Result<String, RouteError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };

    gpx.waypoints.push(named_waypoint(&route.start_coords, &route.start_location));
    gpx.waypoints.push(named_waypoint(&route.end_coords, &route.end_location));

    let mut track = Track {
        name: Some(format!(
            "{} → {} ({})",
            route.start_location, route.end_location, route.transport_mode
        )),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    for waypoint in route.coordinates.iter().map(to_waypoint) {
        segment.points.push(waypoint);
    }
    track.segments.push(segment);
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn to_waypoint(coord: &Coordinate) -> Waypoint {
    Waypoint::new(Point::new(coord.lon, coord.lat))
}

fn named_waypoint(coord: &Coordinate, name: &str) -> Waypoint {
    let mut waypoint = to_waypoint(coord);
    waypoint.name = Some(name.to_string());
    waypoint
}
