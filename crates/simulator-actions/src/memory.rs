//! In-process document store.
//!
//! Used by `worker --dry-run` and by tests. Every connection handed out by a
//! [`MemoryStore`] shares the same collections.

use crate::error::ActionError;
use crate::store::{DocumentId, StoreConnection, StoreConnector, ID_FIELD};
use bson::oid::ObjectId;
use bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Namespace = (String, String);

#[derive(Default)]
struct Collections {
    documents: HashMap<Namespace, Vec<Document>>,
    inserted: HashMap<Namespace, Vec<DocumentId>>,
    deleted: HashMap<Namespace, Vec<DocumentId>>,
}

#[derive(Default)]
struct Shared {
    collections: Mutex<Collections>,
    opened: AtomicUsize,
    open: AtomicUsize,
    unavailable: AtomicBool,
}

/// Shared in-memory store implementing [`StoreConnector`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

fn namespace(database: &str, collection: &str) -> Namespace {
    (database.to_string(), collection.to_string())
}

fn matches_id(doc: &Document, id: &DocumentId) -> bool {
    doc.get(ID_FIELD) == Some(id.as_bson())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // A panicking test thread must not wedge every other user of the store.
        self.shared
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every subsequent connect attempt fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.shared.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Insert a document directly, bypassing connections.
    pub fn insert(&self, database: &str, collection: &str, document: Document) -> DocumentId {
        insert_into(&mut self.lock(), database, collection, document)
    }

    /// Fetch a document directly, bypassing connections.
    pub fn get(&self, database: &str, collection: &str, id: &DocumentId) -> Option<Document> {
        self.lock()
            .documents
            .get(&namespace(database, collection))
            .and_then(|docs| docs.iter().find(|d| matches_id(d, id)).cloned())
    }

    /// Number of documents currently in a collection.
    pub fn count(&self, database: &str, collection: &str) -> usize {
        self.lock()
            .documents
            .get(&namespace(database, collection))
            .map_or(0, Vec::len)
    }

    /// Identifiers of every document ever inserted into a collection, in order.
    pub fn inserted_ids(&self, database: &str, collection: &str) -> Vec<DocumentId> {
        self.lock()
            .inserted
            .get(&namespace(database, collection))
            .cloned()
            .unwrap_or_default()
    }

    /// Identifiers of every document deleted from a collection, in order.
    pub fn deleted_ids(&self, database: &str, collection: &str) -> Vec<DocumentId> {
        self.lock()
            .deleted
            .get(&namespace(database, collection))
            .cloned()
            .unwrap_or_default()
    }

    /// Total connections handed out so far.
    pub fn connections_opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Connections handed out and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.shared.open.load(Ordering::SeqCst)
    }
}

fn insert_into(
    collections: &mut Collections,
    database: &str,
    collection: &str,
    document: Document,
) -> DocumentId {
    let id = DocumentId::from(ObjectId::new());
    let mut stored = Document::new();
    stored.insert(ID_FIELD, id.as_bson().clone());
    for (key, value) in document {
        if key != ID_FIELD {
            stored.insert(key, value);
        }
    }

    let ns = namespace(database, collection);
    collections
        .documents
        .entry(ns.clone())
        .or_default()
        .push(stored);
    collections.inserted.entry(ns).or_default().push(id.clone());
    id
}

#[async_trait::async_trait]
impl StoreConnector for MemoryStore {
    async fn connect(&self, address: &str) -> Result<Box<dyn StoreConnection>, ActionError> {
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(ActionError::Unavailable(format!(
                "store at {address} is not reachable"
            )));
        }
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        self.shared.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            store: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MemoryConnection {
    store: MemoryStore,
    closed: AtomicBool,
}

impl MemoryConnection {
    fn check_open(&self) -> Result<(), ActionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ActionError::Unavailable("connection closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StoreConnection for MemoryConnection {
    async fn find_any_id(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Option<DocumentId>, ActionError> {
        self.check_open()?;
        Ok(self
            .store
            .lock()
            .documents
            .get(&namespace(database, collection))
            .and_then(|docs| docs.first())
            .and_then(|doc| doc.get(ID_FIELD))
            .map(|id| DocumentId::new(id.clone())))
    }

    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, ActionError> {
        self.check_open()?;
        Ok(self.store.get(database, collection, id))
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<DocumentId, ActionError> {
        self.check_open()?;
        Ok(insert_into(
            &mut self.store.lock(),
            database,
            collection,
            document,
        ))
    }

    async fn set_fields(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> Result<(), ActionError> {
        self.check_open()?;
        let mut collections = self.store.lock();
        let target = collections
            .documents
            .get_mut(&namespace(database, collection))
            .and_then(|docs| docs.iter_mut().find(|d| matches_id(d, id)));
        if let Some(doc) = target {
            for (key, value) in fields {
                if key != ID_FIELD {
                    doc.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<bool, ActionError> {
        self.check_open()?;
        let ns = namespace(database, collection);
        let mut collections = self.store.lock();
        let removed = match collections.documents.get_mut(&ns) {
            Some(docs) => match docs.iter().position(|d| matches_id(d, id)) {
                Some(index) => {
                    docs.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };
        if removed {
            collections.deleted.entry(ns).or_default().push(id.clone());
        }
        Ok(removed)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.store.shared.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
