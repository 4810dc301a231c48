//! MongoDB-backed store connector.

use crate::error::ActionError;
use crate::store::{DocumentId, StoreConnection, StoreConnector, ID_FIELD};
use bson::{doc, Document};
use mongodb::{options::ClientOptions, Client, Collection};
use std::time::Duration;
use tracing::debug;

/// Default connect and server selection timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens a fresh MongoDB client per adapter call.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    timeout: Duration,
}

impl Default for MongoConnector {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MongoConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the connect and server selection timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn StoreConnection>, ActionError> {
        let mut options = ClientOptions::parse(address).await?;
        // Keep an unreachable server from hanging a run.
        options.connect_timeout = Some(self.timeout);
        options.server_selection_timeout = Some(self.timeout);

        let client = Client::with_options(options)?;
        debug!("MongoDB client created");
        Ok(Box::new(MongoConnection { client }))
    }
}

struct MongoConnection {
    client: Client,
}

impl MongoConnection {
    fn collection(&self, database: &str, collection: &str) -> Collection<Document> {
        self.client.database(database).collection(collection)
    }
}

fn id_filter(id: &DocumentId) -> Document {
    doc! { "_id": id.as_bson().clone() }
}

#[async_trait::async_trait]
impl StoreConnection for MongoConnection {
    async fn find_any_id(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Option<DocumentId>, ActionError> {
        let found = self
            .collection(database, collection)
            .find_one(doc! {})
            .projection(doc! { "_id": 1 })
            .await?;
        Ok(found
            .and_then(|doc| doc.get(ID_FIELD).cloned())
            .map(DocumentId::new))
    }

    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, ActionError> {
        Ok(self
            .collection(database, collection)
            .find_one(id_filter(id))
            .await?)
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<DocumentId, ActionError> {
        let result = self
            .collection(database, collection)
            .insert_one(document)
            .await?;
        Ok(DocumentId::new(result.inserted_id))
    }

    async fn set_fields(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> Result<(), ActionError> {
        self.collection(database, collection)
            .update_one(id_filter(id), doc! { "$set": fields })
            .await?;
        Ok(())
    }

    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<bool, ActionError> {
        let result = self
            .collection(database, collection)
            .delete_one(id_filter(id))
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        debug!("MongoDB client shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use bson::Bson;

    #[test]
    fn test_id_filter() {
        let oid = ObjectId::new();
        let filter = id_filter(&DocumentId::from(oid));
        assert_eq!(filter.get(ID_FIELD), Some(&Bson::ObjectId(oid)));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_address() {
        let connector = MongoConnector::new();
        assert!(matches!(
            connector.connect("not-a-uri").await,
            Err(ActionError::MongoDB(_))
        ));
    }
}
