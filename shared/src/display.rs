use crate::{Route, TransportMode};

/// Formats a duration given in minutes, rounded to the nearest minute.
pub fn format_duration(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    if total < 60 {
        return format!("{total} min");
    }
    let hours = total / 60;
    match total % 60 {
        0 => format!("{hours} h"),
        rest => format!("{hours} h {rest} min"),
    }
}

/// Formats a distance given in meters.
pub fn format_distance(meters: f64) -> String {
    let rounded = meters.max(0.0).round();
    if rounded < 1000.0 {
        format!("{} m", rounded as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

pub fn emission_label(route: &Route) -> String {
    if route.transport_mode.is_eco_friendly() {
        "Zero emissions".to_string()
    } else {
        format!("{:.2} kg CO₂", route.emissions)
    }
}

pub fn mode_label(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Driving => "Driving",
        TransportMode::Cycling => "Cycling",
        TransportMode::Walking => "Walking",
        TransportMode::Transit => "Transit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_under_an_hour_stay_in_minutes() {
        assert_eq!(format_duration(0.0), "0 min");
        assert_eq!(format_duration(42.4), "42 min");
        assert_eq!(format_duration(59.4), "59 min");
    }

    #[test]
    fn durations_over_an_hour_split_hours() {
        assert_eq!(format_duration(60.0), "1 h");
        assert_eq!(format_duration(95.0), "1 h 35 min");
        assert_eq!(format_duration(59.6), "1 h");
    }

    #[test]
    fn distances_switch_to_km() {
        assert_eq!(format_distance(420.0), "420 m");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(12_345.0), "12.3 km");
    }

    #[test]
    fn distance_rounding_up_to_a_kilometre_uses_km() {
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(999.6), "1.0 km");
    }

    fn route(mode: TransportMode, emissions: f64) -> Route {
        let point = crate::Coordinate::new(51.5, -0.1);
        Route {
            id: format!("{mode}-test"),
            transport_mode: mode,
            distance: 5000.0,
            duration: 12.0,
            emissions,
            coordinates: vec![point, point],
            start_coords: point,
            end_coords: point,
            start_location: "A".into(),
            end_location: "B".into(),
            steps: Vec::new(),
            is_eco_friendly: mode.is_eco_friendly(),
        }
    }

    #[test]
    fn labels() {
        assert_eq!(mode_label(TransportMode::Transit), "Transit");
        assert_eq!(emission_label(&route(TransportMode::Walking, 0.0)), "Zero emissions");
        assert_eq!(emission_label(&route(TransportMode::Driving, 0.6)), "0.60 kg CO₂");
        assert_eq!(emission_label(&route(TransportMode::Transit, 0.0)), "0.00 kg CO₂");
    }
}
