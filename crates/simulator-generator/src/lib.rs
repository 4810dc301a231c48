//! Record generators for mongo-simulator.
//!
//! This crate produces the synthetic domain records the mutation engine writes
//! into MongoDB. Every generator yields a [`CollectionBatch`]: exactly one
//! collection name and a list of records whose field set is fixed per model.
//!
//! # Architecture
//!
//! ```text
//!   Model + Locale + Quantity
//!              │
//!              ▼
//!   ┌───────────────────────┐
//!   │    RecordGenerator    │
//!   │                       │
//!   │  - locale word pools  │
//!   │  - rng (StdRng)       │
//!   │  - bundled seed data  │
//!   └──────────┬────────────┘
//!              │
//!              ▼
//!   CollectionBatch { collection, records }
//! ```
//!
//! # Example
//!
//! ```rust
//! use simulator_generator::{Locale, Model, Quantity, RecordGenerator};
//!
//! let mut generator = RecordGenerator::with_seed(Locale::PtBr, 42);
//! let batch = generator
//!     .generate(Model::Driver, None, Quantity::new(2).unwrap())
//!     .unwrap();
//! assert_eq!(batch.collection, "DriverCollection");
//! assert_eq!(batch.records.len(), 2);
//! ```
//!
//! # Models
//!
//! - `driver` - name, CNH number, address, phone, e-mail
//! - `vehicle` - kind, plate, dimensions
//! - `client` - company name, CNPJ, address, phone, e-mail
//! - `location` - municipality picked from the bundled seed
//! - `product` - product picked from the bundled seed
//! - `delivery` - composite of all the above, origin != destination

pub mod generator;
pub mod generators;
pub mod locale;
pub mod model;
pub mod quantity;
pub mod seed;

pub use generator::{CollectionBatch, GeneratorError, Record, RecordGenerator};
pub use locale::Locale;
pub use model::Model;
pub use quantity::Quantity;
