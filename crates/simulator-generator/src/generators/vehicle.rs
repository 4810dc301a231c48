//! Vehicle records.

use super::{digits, digits_to_string, letters, pick};
use crate::generator::Record;
use crate::locale::Locale;
use rand::Rng;
use serde_json::{json, Value};

const VEHICLE_KINDS: &[&str] = &["Truck", "Báu", "Van", "Mini-Cargo"];

/// Generate one vehicle.
pub fn vehicle<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> Record {
    let mut record = Record::new();
    record.insert("name".into(), Value::String(pick(rng, VEHICLE_KINDS).to_string()));
    record.insert("vehicle_plate".into(), Value::String(license_plate(rng, locale)));
    record.insert(
        "dimensions".into(),
        json!({
            "length": dimension(rng),
            "width": dimension(rng),
            "height": dimension(rng),
        }),
    );
    record
}

/// Mercosul plate (`ABC1D23`) or a US-style plate (`ABC-1234`).
pub fn license_plate<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> String {
    match locale {
        Locale::PtBr => format!(
            "{}{}{}{}",
            letters(rng, 3),
            rng.random_range(0..10),
            letters(rng, 1),
            digits_to_string(&digits(rng, 2))
        ),
        Locale::EnUs => format!("{}-{}", letters(rng, 3), digits_to_string(&digits(rng, 4))),
    }
}

/// Metres in `[0, 5)`, one decimal place.
fn dimension<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.random_range(0.0..5.0_f64) * 10.0).round() / 10.0
}
