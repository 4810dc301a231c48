//! Single-document actions against one collection of one database.
//!
//! [`DocumentActions`] is the adapter the mutation engine calls once per
//! iteration. It opens a connection through a [`StoreConnector`], performs one
//! create, partial update or delete, and closes the connection again. There is
//! no pooling and no state carried across calls.
//!
//! Update and delete never fail for lack of a target: when the collection is
//! empty a document is created from the candidate payload first, and the
//! mutation is applied to that new document.
//!
//! Two connectors are provided:
//!
//! - [`MongoConnector`] talks to a real MongoDB deployment.
//! - [`MemoryStore`] keeps documents in process, for dry runs and tests.

pub mod actions;
pub mod error;
pub mod grade;
pub mod memory;
pub mod mongo;
pub mod store;

pub use actions::{to_payload, Action, ActionOutcome, DocumentActions};
pub use error::ActionError;
pub use grade::{select_fields, EditingGrade};
pub use memory::MemoryStore;
pub use mongo::MongoConnector;
pub use store::{DocumentId, StoreConnection, StoreConnector, ID_FIELD};
