//! The document action adapter.

use crate::error::ActionError;
use crate::grade::{select_fields, EditingGrade};
use crate::store::{DocumentId, StoreConnection, StoreConnector, ID_FIELD};
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mutation kind the engine can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

    /// Label used in the per-action log line.
    pub fn log_label(&self) -> &'static str {
        match self {
            Action::Create => "ADD DOCUMENT",
            Action::Update => "UPDATE DOCUMENT",
            Action::Delete => "DELETE DOCUMENT",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            _ => Err(format!("Unknown action: {s}")),
        }
    }
}

/// Result of one adapter call.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: Action,
    pub collection: String,
    pub id: DocumentId,
    /// The collection was empty and the target had to be created first.
    pub created_target: bool,
    /// Fields overwritten by an update (always zero for create/delete).
    pub fields_updated: usize,
}

/// Convert a serialisable payload (a generated record) into a BSON document.
pub fn to_payload<T: Serialize>(value: &T) -> Result<Document, ActionError> {
    Ok(bson::to_document(value)?)
}

/// Adapter performing single-document actions in one collection.
///
/// Each public operation opens its own connection and closes it before
/// returning, whether the operation succeeded or not.
pub struct DocumentActions<'a> {
    connector: &'a dyn StoreConnector,
    address: String,
    database: String,
    collection: String,
    payload: Document,
}

impl<'a> DocumentActions<'a> {
    /// Create an adapter bound to one collection and one candidate payload.
    ///
    /// # Arguments
    ///
    /// * `connector` - Store connection factory
    /// * `address` - Store address (e.g., "mongodb://mongodb:27017/")
    /// * `database` - Database name
    /// * `collection` - Collection name
    /// * `payload` - Candidate document used for inserts and as the source of
    ///   replacement values for updates
    pub fn new(
        connector: &'a dyn StoreConnector,
        address: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
        payload: Document,
    ) -> Self {
        Self {
            connector,
            address: address.into(),
            database: database.into(),
            collection: collection.into(),
            payload,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Identifier of an arbitrary existing document, or `None` when the
    /// collection is empty.
    pub async fn fetch_any_identifier(&self) -> Result<Option<DocumentId>, ActionError> {
        let conn = self.connector.connect(&self.address).await?;
        let result = conn.find_any_id(&self.database, &self.collection).await;
        conn.close().await;
        result
    }

    /// Insert the candidate payload and return the new identifier.
    pub async fn create(&self) -> Result<DocumentId, ActionError> {
        Ok(self.perform(Action::Create, EditingGrade::default()).await?.id)
    }

    /// Overwrite a subset of an existing document's fields with the payload's
    /// values and return the target identifier.
    pub async fn update(&self, grade: EditingGrade) -> Result<DocumentId, ActionError> {
        Ok(self.perform(Action::Update, grade).await?.id)
    }

    /// Remove an existing document and return its identifier.
    pub async fn delete(&self) -> Result<DocumentId, ActionError> {
        Ok(self.perform(Action::Delete, EditingGrade::default()).await?.id)
    }

    /// Run `action` on a fresh connection. `grade` only matters for updates.
    pub async fn perform(
        &self,
        action: Action,
        grade: EditingGrade,
    ) -> Result<ActionOutcome, ActionError> {
        let conn = self.connector.connect(&self.address).await?;
        let result = match action {
            Action::Create => self.create_on(conn.as_ref()).await,
            Action::Update => self.update_on(conn.as_ref(), grade).await,
            Action::Delete => self.delete_on(conn.as_ref()).await,
        };
        conn.close().await;
        result
    }

    async fn insert_payload(&self, conn: &dyn StoreConnection) -> Result<DocumentId, ActionError> {
        conn.insert_one(&self.database, &self.collection, self.payload.clone())
            .await
    }

    /// Existing identifier, or the identifier of a document created for the
    /// occasion. The flag tells which of the two happened.
    async fn resolve_target(
        &self,
        conn: &dyn StoreConnection,
    ) -> Result<(DocumentId, bool), ActionError> {
        match conn.find_any_id(&self.database, &self.collection).await? {
            Some(id) => Ok((id, false)),
            None => {
                debug!(
                    "Collection '{}' is empty, creating a target document first",
                    self.collection
                );
                Ok((self.insert_payload(conn).await?, true))
            }
        }
    }

    async fn create_on(&self, conn: &dyn StoreConnection) -> Result<ActionOutcome, ActionError> {
        let id = self.insert_payload(conn).await?;
        Ok(self.outcome(Action::Create, id, false, 0))
    }

    async fn update_on(
        &self,
        conn: &dyn StoreConnection,
        grade: EditingGrade,
    ) -> Result<ActionOutcome, ActionError> {
        let (id, created_target) = self.resolve_target(conn).await?;

        // The target may have been removed by a concurrent run in between;
        // that lost update is accepted and reported as touching no fields.
        let Some(existing) = conn.find_by_id(&self.database, &self.collection, &id).await? else {
            return Ok(self.outcome(Action::Update, id, created_target, 0));
        };

        let update = self.build_update(&existing, grade);
        let fields_updated = update.len();
        if fields_updated > 0 {
            conn.set_fields(&self.database, &self.collection, &id, update)
                .await?;
        }

        Ok(self.outcome(Action::Update, id, created_target, fields_updated))
    }

    async fn delete_on(&self, conn: &dyn StoreConnection) -> Result<ActionOutcome, ActionError> {
        let (id, created_target) = self.resolve_target(conn).await?;
        conn.delete_one(&self.database, &self.collection, &id).await?;
        Ok(self.outcome(Action::Delete, id, created_target, 0))
    }

    /// `$set` body for `existing`: a random selection of its non-identifier
    /// fields, valued from the payload (null where the payload lacks a field).
    fn build_update(&self, existing: &Document, grade: EditingGrade) -> Document {
        let fields: Vec<String> = existing
            .keys()
            .filter(|key| key.as_str() != ID_FIELD)
            .cloned()
            .collect();
        let count = grade.fields_to_update(fields.len());
        let selected = select_fields(&mut rand::rng(), &fields, count);

        selected
            .into_iter()
            .map(|field| {
                let value = self.payload.get(&field).cloned().unwrap_or(Bson::Null);
                (field, value)
            })
            .collect()
    }

    fn outcome(
        &self,
        action: Action,
        id: DocumentId,
        created_target: bool,
        fields_updated: usize,
    ) -> ActionOutcome {
        ActionOutcome {
            action,
            collection: self.collection.clone(),
            id,
            created_target,
            fields_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use bson::doc;

    const ADDRESS: &str = "memory://test";
    const DB: &str = "testdb";

    fn payload(fields: usize) -> Document {
        (0..fields)
            .map(|i| (format!("f{i}"), Bson::String(format!("new-{i}"))))
            .collect()
    }

    fn existing(fields: usize) -> Document {
        (0..fields)
            .map(|i| (format!("f{i}"), Bson::String(format!("old-{i}"))))
            .collect()
    }

    fn changed_fields(doc: &Document) -> usize {
        doc.iter()
            .filter(|(_, v)| matches!(v, Bson::String(s) if s.starts_with("new-")))
            .count()
    }

    #[test]
    fn test_action_parse_and_display() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
        assert!("upsert".parse::<Action>().is_err());
        assert_eq!(Action::Create.log_label(), "ADD DOCUMENT");
    }

    #[tokio::test]
    async fn test_create_inserts_payload() {
        let store = MemoryStore::new();
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(3));

        let id = actions.create().await.unwrap();

        let stored = store.get(DB, "drivers", &id).unwrap();
        assert_eq!(stored.get_str("f0").unwrap(), "new-0");
        assert_eq!(store.count(DB, "drivers"), 1);
    }

    #[tokio::test]
    async fn test_fetch_any_identifier_on_empty_collection() {
        let store = MemoryStore::new();
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(1));
        assert_eq!(actions.fetch_any_identifier().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_ten_percent_of_ten_fields_touches_one() {
        let store = MemoryStore::new();
        let id = store.insert(DB, "drivers", existing(10));
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(10));

        let outcome = actions
            .perform(Action::Update, EditingGrade::Percent(10))
            .await
            .unwrap();

        assert_eq!(outcome.id, id);
        assert_eq!(outcome.fields_updated, 1);
        assert!(!outcome.created_target);
        assert_eq!(changed_fields(&store.get(DB, "drivers", &id).unwrap()), 1);
    }

    #[tokio::test]
    async fn test_update_count_mode() {
        let store = MemoryStore::new();
        let id = store.insert(DB, "drivers", existing(4));
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(4));

        let outcome = actions
            .perform(Action::Update, EditingGrade::Count(3))
            .await
            .unwrap();
        assert_eq!(outcome.fields_updated, 3);
        assert_eq!(changed_fields(&store.get(DB, "drivers", &id).unwrap()), 3);

        let outcome = actions
            .perform(Action::Update, EditingGrade::Count(9))
            .await
            .unwrap();
        assert_eq!(outcome.fields_updated, 4);
    }

    #[tokio::test]
    async fn test_update_document_without_fields() {
        let store = MemoryStore::new();
        let id = store.insert(DB, "empty", Document::new());
        let actions = DocumentActions::new(&store, ADDRESS, DB, "empty", payload(2));

        let outcome = actions
            .perform(Action::Update, EditingGrade::Percent(10))
            .await
            .unwrap();

        assert_eq!(outcome.id, id);
        assert_eq!(outcome.fields_updated, 0);
    }

    #[tokio::test]
    async fn test_update_missing_payload_field_sets_null() {
        let store = MemoryStore::new();
        let id = store.insert(DB, "drivers", doc! { "legacy": "value" });
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(1));

        actions.update(EditingGrade::Count(1)).await.unwrap();

        let stored = store.get(DB, "drivers", &id).unwrap();
        assert_eq!(stored.get("legacy"), Some(&Bson::Null));
    }

    #[tokio::test]
    async fn test_update_on_empty_collection_creates_target() {
        let store = MemoryStore::new();
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(5));

        let outcome = actions
            .perform(Action::Update, EditingGrade::default())
            .await
            .unwrap();

        assert!(outcome.created_target);
        assert!(store.get(DB, "drivers", &outcome.id).is_some());
        assert_eq!(store.count(DB, "drivers"), 1);
    }

    #[tokio::test]
    async fn test_delete_on_empty_collection_creates_then_removes() {
        let store = MemoryStore::new();
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(2));

        let outcome = actions
            .perform(Action::Delete, EditingGrade::default())
            .await
            .unwrap();

        assert!(outcome.created_target);
        assert_eq!(store.count(DB, "drivers"), 0);
        assert_eq!(store.inserted_ids(DB, "drivers"), vec![outcome.id.clone()]);
        assert_eq!(store.deleted_ids(DB, "drivers"), vec![outcome.id]);
    }

    #[tokio::test]
    async fn test_delete_removes_existing_document() {
        let store = MemoryStore::new();
        let id = store.insert(DB, "drivers", existing(2));
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(2));

        assert_eq!(actions.delete().await.unwrap(), id);
        assert_eq!(store.count(DB, "drivers"), 0);
    }

    #[tokio::test]
    async fn test_connection_closed_after_each_call() {
        let store = MemoryStore::new();
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(2));

        actions.create().await.unwrap();
        actions.update(EditingGrade::default()).await.unwrap();
        actions.delete().await.unwrap();

        assert_eq!(store.connections_opened(), 3);
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_surfaces_error() {
        let store = MemoryStore::new();
        store.set_available(false);
        let actions = DocumentActions::new(&store, ADDRESS, DB, "drivers", payload(1));

        assert!(matches!(
            actions.create().await,
            Err(ActionError::Unavailable(_))
        ));
    }

    #[test]
    fn test_to_payload_from_json() {
        let record = serde_json::json!({"name": "Ana", "dimensions": {"length": 1.5}});
        let doc = to_payload(&record).unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "Ana");
        assert_eq!(
            doc.get_document("dimensions").unwrap().get_f64("length").unwrap(),
            1.5
        );
    }
}
