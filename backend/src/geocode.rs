use rand::Rng;
use shared::{Coordinate, PlaceSuggestion};

/// Reference point for names the table does not know.
pub const DEFAULT_REFERENCE: Coordinate = Coordinate::new(51.505, -0.09);
/// Maximum offset applied to the reference point, in degrees per axis.
pub const UNKNOWN_PLACE_JITTER_DEG: f64 = 0.1;

const KNOWN_CITIES: &[(&str, f64, f64)] = &[
    ("london", 51.5074, -0.1278),
    ("manchester", 53.4808, -2.2426),
    ("birmingham", 52.4862, -1.8904),
    ("leeds", 53.8008, -1.5491),
    ("liverpool", 53.4084, -2.9916),
    ("bristol", 51.4545, -2.5879),
    ("edinburgh", 55.9533, -3.1883),
    ("glasgow", 55.8642, -4.2518),
    ("cardiff", 51.4816, -3.1791),
    ("oxford", 51.7520, -1.2577),
    ("cambridge", 52.2053, 0.1218),
    ("paris", 48.8566, 2.3522),
    ("berlin", 52.5200, 13.4050),
    ("amsterdam", 52.3676, 4.9041),
    ("brussels", 50.8503, 4.3517),
    ("madrid", 40.4168, -3.7038),
    ("rome", 41.9028, 12.4964),
    ("new york", 40.7128, -74.0060),
    ("san francisco", 37.7749, -122.4194),
    ("tokyo", 35.6762, 139.6503),
];

/// Case-insensitive exact match against the city table.
pub fn known_city(place: &str) -> Option<Coordinate> {
    let needle = place.trim().to_lowercase();
    KNOWN_CITIES
        .iter()
        .find(|(name, _, _)| *name == needle)
        .map(|&(_, lat, lon)| Coordinate::new(lat, lon))
}

pub fn jittered_reference<R: Rng + ?Sized>(rng: &mut R) -> Coordinate {
    Coordinate::new(
        DEFAULT_REFERENCE.lat + rng.random_range(-UNKNOWN_PLACE_JITTER_DEG..=UNKNOWN_PLACE_JITTER_DEG),
        DEFAULT_REFERENCE.lon + rng.random_range(-UNKNOWN_PLACE_JITTER_DEG..=UNKNOWN_PLACE_JITTER_DEG),
    )
}

/// Table lookup, then a jittered guess around the default point. The guess is
/// deliberately imprecise.
pub fn offline_geocode<R: Rng + ?Sized>(place: &str, rng: &mut R) -> Coordinate {
    match known_city(place) {
        Some(coord) => coord,
        None => {
            tracing::debug!(place, "no table entry, using jittered reference point");
            jittered_reference(rng)
        }
    }
}

/// Table entries whose name starts with `text`, in table order.
pub fn table_suggestions(text: &str) -> Vec<PlaceSuggestion> {
    let prefix = text.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }
    KNOWN_CITIES
        .iter()
        .filter(|(name, _, _)| name.starts_with(&prefix))
        .map(|&(name, lat, lon)| {
            let title = title_case(name);
            PlaceSuggestion {
                name: title.clone(),
                label: title,
                coordinate: Coordinate::new(lat, lon),
            }
        })
        .collect()
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn london_is_in_the_table() {
        assert_eq!(known_city("london"), Some(Coordinate::new(51.5074, -0.1278)));
        assert_eq!(known_city("  LONDON "), Some(Coordinate::new(51.5074, -0.1278)));
    }

    #[test]
    fn table_match_is_exact() {
        assert_eq!(known_city("london bridge"), None);
        assert_eq!(known_city("New York"), Some(Coordinate::new(40.7128, -74.0060)));
    }

    #[test]
    fn unknown_places_stay_near_reference() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let c = offline_geocode("Atlantis", &mut rng);
            assert!((c.lat - DEFAULT_REFERENCE.lat).abs() <= UNKNOWN_PLACE_JITTER_DEG);
            assert!((c.lon - DEFAULT_REFERENCE.lon).abs() <= UNKNOWN_PLACE_JITTER_DEG);
        }
    }

    #[test]
    fn jitter_is_reproducible_with_a_seed() {
        let a = offline_geocode("Atlantis", &mut StdRng::seed_from_u64(3));
        let b = offline_geocode("Atlantis", &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn suggestions_match_prefix() {
        let names: Vec<_> = table_suggestions("ma")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Manchester", "Madrid"]);
        assert_eq!(table_suggestions("new")[0].label, "New York");
        assert!(table_suggestions(" ").is_empty());
    }
}
