//! Store connection traits.
//!
//! These traits abstract the document store so the adapter and the mutation
//! engine can run against MongoDB or an in-process store with the same code.

use crate::error::ActionError;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Name of the identifier field every document carries.
pub const ID_FIELD: &str = "_id";

/// Opaque identifier of a document within one (database, collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Bson);

impl DocumentId {
    pub fn new(value: Bson) -> Self {
        Self(value)
    }

    pub fn as_bson(&self) -> &Bson {
        &self.0
    }

    pub fn into_inner(self) -> Bson {
        self.0
    }
}

impl From<bson::oid::ObjectId> for DocumentId {
    fn from(oid: bson::oid::ObjectId) -> Self {
        Self(Bson::ObjectId(oid))
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Bson::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            Bson::String(s) => write!(f, "{s}"),
            other => write!(f, "{other}"),
        }
    }
}

/// Factory for per-call store connections.
///
/// The adapter calls [`connect`](StoreConnector::connect) at the start of each
/// operation and [`close`](StoreConnection::close) at the end of it.
#[async_trait::async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a connection to the store at `address`.
    async fn connect(&self, address: &str) -> Result<Box<dyn StoreConnection>, ActionError>;
}

/// One open connection to a document store.
///
/// Each method is a single store call and relies on the store's own
/// per-document atomicity; nothing here takes locks across calls.
#[async_trait::async_trait]
pub trait StoreConnection: Send + Sync {
    /// Identifier of an arbitrary document in the collection, if any.
    async fn find_any_id(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Option<DocumentId>, ActionError>;

    /// Fetch a full document by identifier.
    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, ActionError>;

    /// Insert a document and return its new identifier.
    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<DocumentId, ActionError>;

    /// Overwrite the given fields of one document (`$set` semantics).
    async fn set_fields(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> Result<(), ActionError>;

    /// Delete one document. Returns whether a document was removed.
    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<bool, ActionError>;

    /// Release the connection.
    async fn close(&self);
}
