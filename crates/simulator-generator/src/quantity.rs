//! Validated record quantity.

use crate::generator::GeneratorError;

/// Number of records to generate. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    /// Validate a raw quantity.
    pub fn new(value: i64) -> Result<Self, GeneratorError> {
        Self::try_from(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = GeneratorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(GeneratorError::InvalidQuantity(value.to_string()));
        }
        u32::try_from(value)
            .map(Quantity)
            .map_err(|_| GeneratorError::InvalidQuantity(value.to_string()))
    }
}

impl std::str::FromStr for Quantity {
    type Err = GeneratorError;

    /// Only integer text is accepted: "2.5" and "abc" are rejected like "0".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| GeneratorError::InvalidQuantity(s.to_string()))?;
        Self::try_from(value)
    }
}
