//! Location records drawn from the bundled municipality seed.

use crate::generator::{GeneratorError, Record};
use crate::seed;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::json;

/// Generate one location.
pub fn location<R: Rng + ?Sized>(rng: &mut R) -> Result<Record, GeneratorError> {
    let municipalities = seed::municipalities()?;
    let row = municipalities
        .choose(rng)
        .ok_or_else(|| GeneratorError::Seed("municipality seed is empty".to_string()))?;

    let mut record = Record::new();
    record.insert("city_id".into(), json!(row.city_id));
    record.insert("city_name".into(), json!(row.city_name));
    record.insert(
        "coordinates".into(),
        json!({
            "latitude": row.latitude,
            "longitude": row.longitude,
        }),
    );
    Ok(record)
}
