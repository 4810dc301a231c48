//! Bundled seed data (municipalities and products).
//!
//! Both files are compiled into the binary and parsed once on first use.

use crate::generator::{GeneratorError, Record};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

const MUNICIPALITIES_CSV: &str = include_str!("../seed/municipalities.csv");
const PRODUCTS_JSON: &str = include_str!("../seed/products.json");

/// One row of the municipality seed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Municipality {
    #[serde(rename = "codigo_ibge")]
    pub city_id: String,
    #[serde(rename = "nome")]
    pub city_name: String,
    pub latitude: String,
    pub longitude: String,
}

static MUNICIPALITIES: OnceLock<Result<Vec<Municipality>, String>> = OnceLock::new();
static PRODUCTS: OnceLock<Result<Vec<Record>, String>> = OnceLock::new();

/// All bundled municipalities.
pub fn municipalities() -> Result<&'static [Municipality], GeneratorError> {
    MUNICIPALITIES
        .get_or_init(|| parse_municipalities(MUNICIPALITIES_CSV))
        .as_deref()
        .map_err(|e| GeneratorError::Seed(e.clone()))
}

/// All bundled products.
pub fn products() -> Result<&'static [Record], GeneratorError> {
    PRODUCTS
        .get_or_init(|| parse_products(PRODUCTS_JSON))
        .as_deref()
        .map_err(|e| GeneratorError::Seed(e.clone()))
}

/// Number of municipalities that differ in at least one field.
pub fn distinct_municipality_count() -> Result<usize, GeneratorError> {
    let distinct: HashSet<(&str, &str, &str, &str)> = municipalities()?
        .iter()
        .map(|m| {
            (
                m.city_id.as_str(),
                m.city_name.as_str(),
                m.latitude.as_str(),
                m.longitude.as_str(),
            )
        })
        .collect();
    Ok(distinct.len())
}

fn parse_municipalities(data: &str) -> Result<Vec<Municipality>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    reader
        .deserialize()
        .collect::<Result<Vec<Municipality>, _>>()
        .map_err(|e| format!("invalid municipality seed: {e}"))
}

fn parse_products(data: &str) -> Result<Vec<Record>, String> {
    serde_json::from_str(data).map_err(|e| format!("invalid product seed: {e}"))
}
