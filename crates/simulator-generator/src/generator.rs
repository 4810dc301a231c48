//! Main record generator producing one collection batch at a time.

use crate::generators;
use crate::locale::Locale;
use crate::model::Model;
use crate::quantity::Quantity;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A generated document payload: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Quantity was not a positive integer
    #[error("The \"quantity\" parameter must be a positive integer, got {0:?}")]
    InvalidQuantity(String),

    /// Model name not recognised
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Locale tag not recognised
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    /// Bundled seed data could not be used
    #[error("Seed data error: {0}")]
    Seed(String),
}

/// Records produced for exactly one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionBatch {
    /// Target collection name
    pub collection: String,
    /// Generated records, one per requested unit of quantity
    pub records: Vec<Record>,
}

impl CollectionBatch {
    /// Split off the first record, which is all the mutation loop ever asks for.
    pub fn into_first(self) -> Option<(String, Record)> {
        let collection = self.collection;
        self.records
            .into_iter()
            .next()
            .map(|record| (collection, record))
    }
}

/// Generator producing synthetic domain records.
///
/// Holds its own RNG so concurrent runs never share state. Seeded
/// construction gives reproducible output for tests.
pub struct RecordGenerator {
    locale: Locale,
    rng: StdRng,
}

impl RecordGenerator {
    /// Create a generator seeded from the operating system.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a deterministic generator.
    pub fn with_seed(locale: Locale, seed: u64) -> Self {
        Self {
            locale,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Generate `quantity` records of `model`.
    ///
    /// `collection` overrides the model's default collection name.
    pub fn generate(
        &mut self,
        model: Model,
        collection: Option<&str>,
        quantity: Quantity,
    ) -> Result<CollectionBatch, GeneratorError> {
        let records = (0..quantity.get())
            .map(|_| self.next_record(model))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CollectionBatch {
            collection: collection
                .unwrap_or_else(|| model.default_collection())
                .to_string(),
            records,
        })
    }

    /// Generate a single record of `model`.
    pub fn next_record(&mut self, model: Model) -> Result<Record, GeneratorError> {
        let locale = self.locale;
        let rng = &mut self.rng;
        match model {
            Model::Driver => Ok(generators::person::driver(rng, locale)),
            Model::Vehicle => Ok(generators::vehicle::vehicle(rng, locale)),
            Model::Client => Ok(generators::company::client(rng, locale)),
            Model::Location => generators::location::location(rng),
            Model::Product => generators::product::product(rng),
            Model::Delivery => generators::delivery::delivery(rng, locale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collection_names() {
        let mut generator = RecordGenerator::with_seed(Locale::PtBr, 7);
        for model in Model::ALL {
            let batch = generator.generate(model, None, Quantity::ONE).unwrap();
            assert_eq!(batch.collection, model.default_collection());
            assert_eq!(batch.records.len(), 1);
        }
    }

    #[test]
    fn test_custom_collection_name() {
        let mut generator = RecordGenerator::with_seed(Locale::PtBr, 7);
        for model in Model::ALL {
            let batch = generator
                .generate(model, Some("TestCollection"), Quantity::ONE)
                .unwrap();
            assert_eq!(batch.collection, "TestCollection");
        }
    }

    #[test]
    fn test_quantity_controls_record_count() {
        let mut generator = RecordGenerator::with_seed(Locale::EnUs, 1);
        for model in Model::ALL {
            let batch = generator
                .generate(model, None, Quantity::new(3).unwrap())
                .unwrap();
            assert_eq!(batch.records.len(), 3);
        }
    }

    #[test]
    fn test_deterministic_generation() {
        let mut gen1 = RecordGenerator::with_seed(Locale::PtBr, 42);
        let mut gen2 = RecordGenerator::with_seed(Locale::PtBr, 42);

        for model in [Model::Driver, Model::Vehicle, Model::Client, Model::Location] {
            assert_eq!(
                gen1.next_record(model).unwrap(),
                gen2.next_record(model).unwrap()
            );
        }
    }

    #[test]
    fn test_into_first() {
        let mut generator = RecordGenerator::with_seed(Locale::PtBr, 3);
        let batch = generator
            .generate(Model::Product, None, Quantity::new(2).unwrap())
            .unwrap();
        let (collection, record) = batch.into_first().unwrap();
        assert_eq!(collection, "ProductCollection");
        assert!(record.contains_key("name"));
    }
}
