use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationPayload, ApplicationRecord};

/// Acknowledgement returned by the backend after a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
}

/// Storage abstraction over the remote application API so flows can be exercised in isolation.
#[async_trait]
pub trait ApplicationStorage: Send + Sync {
    async fn create_application(
        &self,
        payload: ApplicationPayload,
    ) -> Result<Created, StorageError>;

    async fn list_applications(&self, email: &str)
        -> Result<Vec<ApplicationRecord>, StorageError>;

    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationRecord, StorageError>;

    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: ApplicationPayload,
    ) -> Result<ApplicationRecord, StorageError>;

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), StorageError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("application not found")]
    NotFound,
    #[error("storage unreachable: {0}")]
    Network(String),
    #[error("storage rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected storage response: {0}")]
    Decode(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
