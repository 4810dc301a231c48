//! Error types for document actions.

use thiserror::Error;

/// Errors that can occur while performing a document action.
#[derive(Error, Debug)]
pub enum ActionError {
    /// MongoDB connection or query error.
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    /// Payload could not be converted to BSON.
    #[error("BSON conversion error: {0}")]
    Bson(#[from] bson::ser::Error),

    /// The store refused the connection.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
