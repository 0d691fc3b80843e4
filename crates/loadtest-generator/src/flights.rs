//! Reference flight-document generator.
//!
//! Used for the built-in `flights` collection. On top of the per-field
//! generation it keeps documents internally consistent:
//!
//! - `origin` and `destination` always differ
//! - `seats_available` never exceeds `equipment.total_seats`
//! - `passengers` holds `total_seats - seats_available` entries (at least
//!   one, at most `total_seats`), each with a distinct seat drawn from a
//!   shuffled deck of every seat on the plane

use crate::generators::generate_value;
use crate::providers::{full_name, ProviderRegistry, CITIES};
use rand::seq::SliceRandom;
use rand::Rng;
use workload_core::{CollectionSpec, Document, Value};

pub const MIN_TOTAL_SEATS: i64 = 10;
pub const MAX_TOTAL_SEATS: i64 = 50;

const PLANE_TYPES: &[&str] = &[
    "Boeing 737",
    "Airbus A320",
    "Embraer E190",
    "Bombardier CRJ900",
    "Boeing 777",
    "Airbus A350",
];

const AMENITIES: &[&str] = &[
    "WiFi",
    "TV",
    "Power outlets",
    "Hot meals",
    "Priority boarding",
    "Extra legroom",
];

const SEAT_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F'];

// Attempts at regenerating a colliding destination from its own field
// spec before falling back to the city list.
const DESTINATION_RETRIES: usize = 32;

/// Equipment sub-document and its seat count.
fn random_equipment<R: Rng>(rng: &mut R) -> (Document, i64) {
    let total_seats = rng.gen_range(MIN_TOTAL_SEATS..=MAX_TOTAL_SEATS);

    let count = rng.gen_range(2..=5);
    let picked: Vec<Value> = AMENITIES
        .choose_multiple(rng, count)
        .map(|a| Value::from(*a))
        .collect();
    let plane_type = PLANE_TYPES.choose(rng).copied().unwrap_or(PLANE_TYPES[0]);

    let equipment = Document::new()
        .with("plane_type", plane_type)
        .with("total_seats", total_seats)
        .with("amenities", picked);
    (equipment, total_seats)
}

/// Every seat on a plane, filled row by row (1A, 1B, ... 2A, ...).
pub fn seat_deck(total_seats: usize) -> Vec<String> {
    let mut seats = Vec::with_capacity(total_seats);
    let mut row = 1;
    while seats.len() < total_seats {
        for letter in SEAT_LETTERS {
            if seats.len() >= total_seats {
                break;
            }
            seats.push(format!("{row}{letter}"));
        }
        row += 1;
    }
    seats
}

/// Number of passengers for a flight, clamped to `[1, total_seats]`.
pub fn passenger_count(total_seats: i64, seats_available: i64) -> i64 {
    (total_seats - seats_available).max(1).min(total_seats.max(1))
}

fn random_passengers<R: Rng>(total_seats: i64, seats_available: i64, rng: &mut R) -> Vec<Value> {
    let count = passenger_count(total_seats, seats_available) as usize;
    let mut deck = seat_deck(total_seats.max(1) as usize);
    deck.shuffle(rng);

    deck.into_iter()
        .take(count)
        .enumerate()
        .map(|(i, seat)| {
            let ticket = format!("TCK-{:08}", rng.gen_range(1..=99_999_999));
            Value::Document(
                Document::new()
                    .with("passenger_id", (i + 1) as i32)
                    .with("name", full_name(rng))
                    .with("ticket_number", ticket)
                    .with("seat_number", seat),
            )
        })
        .collect()
}

/// Generate a flight document for a collection spec.
pub fn generate_flight_document<R: Rng>(
    spec: &CollectionSpec,
    rng: &mut R,
    providers: &ProviderRegistry,
) -> Document {
    if spec.fields.is_empty() {
        return fallback_flight(rng);
    }

    let mut doc = Document::new();
    let mut total_seats = 0;
    let mut seats_available = 0;

    for (name, field) in &spec.fields {
        match name.as_str() {
            "equipment" => {
                let (equipment, seats) = random_equipment(rng);
                total_seats = seats;
                doc.insert(name.clone(), equipment);
            }
            "seats_available" => {
                seats_available = rng.gen_range(1..=MAX_TOTAL_SEATS);
                doc.insert(name.clone(), seats_available);
            }
            "passengers" => {}
            _ => doc.insert(name.clone(), generate_value(field, rng, providers)),
        }
    }

    let origin = doc.get("origin").and_then(Value::as_str).map(str::to_string);
    let has_destination = matches!(doc.get("destination"), Some(Value::String(_)));
    if let (Some(origin), true) = (origin, has_destination) {
        let mut destination = doc.get("destination").cloned().unwrap_or(Value::Null);
        let mut attempts = 0;
        while destination.as_str() == Some(origin.as_str()) {
            destination = if attempts < DESTINATION_RETRIES {
                spec.fields
                    .get("destination")
                    .map(|f| generate_value(f, rng, providers))
                    .unwrap_or(Value::Null)
            } else {
                let others: Vec<&&str> = CITIES.iter().filter(|c| **c != origin).collect();
                Value::from(others.choose(rng).map(|c| **c).unwrap_or("Nowhere"))
            };
            attempts += 1;
        }
        doc.insert("destination", destination);
    }

    if total_seats == 0 {
        total_seats = MAX_TOTAL_SEATS;
    }
    if seats_available > total_seats {
        seats_available = rng.gen_range(1..=total_seats);
        doc.insert("seats_available", seats_available);
    }

    if spec.fields.contains_key("passengers") {
        doc.insert(
            "passengers",
            random_passengers(total_seats, seats_available, rng),
        );
    }
    doc
}

fn fallback_flight<R: Rng>(rng: &mut R) -> Document {
    let origin = CITIES.choose(rng).copied().unwrap_or("London");
    let others: Vec<&&str> = CITIES.iter().filter(|c| **c != origin).collect();
    let destination = others.choose(rng).map(|c| **c).unwrap_or("Paris");

    Document::new()
        .with("flight_id", rng.gen_range(0..10_000i32))
        .with("origin", origin)
        .with("destination", destination)
        .with("duration_minutes", rng.gen_range(0..400i32))
        .with("seats_available", rng.gen_range(0..300i32))
        .with(
            "equipment",
            Document::new().with("plane_type", format!("A{}", rng.gen_range(0..320))),
        )
}

/// Default update for flights: either add 1..=5 free seats or reset the
/// flight duration.
pub fn generate_flight_update<R: Rng>(rng: &mut R) -> Document {
    if rng.gen_bool(0.5) {
        Document::new().with(
            "$inc",
            Document::new().with("seats_available", rng.gen_range(1..=5i32)),
        )
    } else {
        Document::new().with(
            "$set",
            Document::new().with("duration_minutes", rng.gen_range(30..430i32)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use workload_core::{FieldKind, FieldSpec};

    fn flights_spec() -> CollectionSpec {
        CollectionSpec::new("airline", "flights")
            .with_field("flight_id", FieldSpec::new(FieldKind::Int32).with_range(1.0, 10000.0))
            .with_field("flight_code", FieldSpec::new(FieldKind::String).with_provider("flight_code"))
            .with_field("origin", FieldSpec::new(FieldKind::String).with_provider("city"))
            .with_field("destination", FieldSpec::new(FieldKind::String).with_provider("city"))
            .with_field("gate", FieldSpec::new(FieldKind::String).with_provider("gate"))
            .with_field("duration_minutes", FieldSpec::new(FieldKind::Int32).with_range(30.0, 600.0))
            .with_field("seats_available", FieldSpec::new(FieldKind::Int32))
            .with_field("equipment", FieldSpec::new(FieldKind::Object))
            .with_field("passengers", FieldSpec::new(FieldKind::Array))
            .with_shard_key("flight_id")
    }

    fn int_field(doc: &Document, key: &str) -> i64 {
        doc.get(key).and_then(Value::as_i64).unwrap()
    }

    #[test]
    fn test_seat_numbers_unique_and_sized() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = flights_spec();
        let providers = ProviderRegistry::builtin();

        for _ in 0..500 {
            let doc = generate_flight_document(&spec, &mut rng, &providers);
            let equipment = doc.get("equipment").and_then(Value::as_document).unwrap();
            let total = int_field(equipment, "total_seats");
            let available = int_field(&doc, "seats_available");
            assert!(available <= total);

            let passengers = doc.get("passengers").and_then(Value::as_array).unwrap();
            let expected = (total - available).max(1).min(total);
            assert_eq!(passengers.len() as i64, expected);

            let seats: HashSet<&str> = passengers
                .iter()
                .map(|p| {
                    p.as_document()
                        .and_then(|d| d.get("seat_number"))
                        .and_then(Value::as_str)
                        .unwrap()
                })
                .collect();
            assert_eq!(seats.len(), passengers.len());
        }
    }

    #[test]
    fn test_origin_differs_from_destination() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = flights_spec();
        let providers = ProviderRegistry::builtin();

        for _ in 0..500 {
            let doc = generate_flight_document(&spec, &mut rng, &providers);
            assert_ne!(doc.get("origin"), doc.get("destination"));
        }
    }

    #[test]
    fn test_constant_destination_still_differs() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut origin = FieldSpec::new(FieldKind::String);
        origin.enum_values = vec!["Oslo".into()];
        let spec = CollectionSpec::new("airline", "flights")
            .with_field("origin", origin.clone())
            .with_field("destination", origin);

        let doc = generate_flight_document(&spec, &mut rng, &ProviderRegistry::builtin());
        assert_eq!(doc.get("origin").and_then(Value::as_str), Some("Oslo"));
        assert_ne!(doc.get("destination").and_then(Value::as_str), Some("Oslo"));
    }

    #[test]
    fn test_seat_deck_layout() {
        let deck = seat_deck(8);
        assert_eq!(deck, vec!["1A", "1B", "1C", "1D", "1E", "1F", "2A", "2B"]);
    }

    #[test]
    fn test_passenger_count_clamps() {
        assert_eq!(passenger_count(30, 10), 20);
        assert_eq!(passenger_count(30, 30), 1);
        assert_eq!(passenger_count(30, 45), 1);
        assert_eq!(passenger_count(30, 0), 30);
    }

    #[test]
    fn test_fallback_flight_without_fields() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = CollectionSpec::new("airline", "flights");
        let doc = generate_flight_document(&spec, &mut rng, &ProviderRegistry::builtin());
        assert!(doc.contains_key("flight_id"));
        assert_ne!(doc.get("origin"), doc.get("destination"));
    }

    #[test]
    fn test_flight_update_shapes() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let update = generate_flight_update(&mut rng);
            match update.first_key() {
                Some("$inc") => {
                    let inc = update.get("$inc").and_then(Value::as_document).unwrap();
                    assert!((1..=5).contains(&int_field(inc, "seats_available")));
                }
                Some("$set") => {
                    let set = update.get("$set").and_then(Value::as_document).unwrap();
                    assert!((30..430).contains(&int_field(set, "duration_minutes")));
                }
                other => panic!("Unexpected update operator {other:?}"),
            }
        }
    }
}
