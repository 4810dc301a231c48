//! Product records drawn from the bundled product seed.

use crate::generator::{GeneratorError, Record};
use crate::seed;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Generate one product.
pub fn product<R: Rng + ?Sized>(rng: &mut R) -> Result<Record, GeneratorError> {
    seed::products()?
        .choose(rng)
        .cloned()
        .ok_or_else(|| GeneratorError::Seed("product seed is empty".to_string()))
}
