//! Composite delivery records.

use super::{company, location, person, product, vehicle};
use crate::generator::{GeneratorError, Record};
use crate::locale::Locale;
use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use serde_json::{json, Value};

/// Most products a single delivery carries.
pub const MAX_PRODUCTS: usize = 5;

/// Generate one delivery composed of a driver, a vehicle, a client, an origin,
/// a distinct destination and one to five products.
pub fn delivery<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> Result<Record, GeneratorError> {
    let driver = person::driver(rng, locale);
    let vehicle = vehicle::vehicle(rng, locale);
    let client = company::client(rng, locale);
    let origin = location::location(rng)?;
    let destination = distinct_location(rng, &origin)?;

    let product_count = rng.random_range(1..=MAX_PRODUCTS);
    let products = (0..product_count)
        .map(|_| product::product(rng).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;

    let mut record = Record::new();
    record.insert("driver".into(), Value::Object(driver));
    record.insert("vehicle".into(), Value::Object(vehicle));
    record.insert("client".into(), Value::Object(client));
    record.insert(
        "data_delivery".into(),
        json!({
            "data_start": future_this_month(rng, Utc::now()).to_rfc3339_opts(SecondsFormat::Secs, true),
            "origin": origin,
            "destination": destination,
            "products": products,
        }),
    );
    Ok(record)
}

/// Draw locations until one differs from `origin`.
fn distinct_location<R: Rng + ?Sized>(
    rng: &mut R,
    origin: &Record,
) -> Result<Record, GeneratorError> {
    if crate::seed::distinct_municipality_count()? < 2 {
        return Err(GeneratorError::Seed(
            "at least two distinct municipalities are required for deliveries".to_string(),
        ));
    }
    loop {
        let candidate = location::location(rng)?;
        if &candidate != origin {
            return Ok(candidate);
        }
    }
}

/// Random instant between `now` and the end of the current month.
pub fn future_this_month<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end_of_month = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now);

    let remaining = (end_of_month - now).num_seconds();
    if remaining <= 0 {
        return now;
    }
    now + Duration::seconds(rng.random_range(0..remaining))
}
