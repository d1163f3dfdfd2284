use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::applications::domain::{
    ApplicationId, ApplicationPayload, ApplicationRecord, AssetEntry, Draft, ExpenseEntry,
    IncomeEntry, LiabilityEntry, NumericField, PersonalDetails,
};
use crate::applications::repository::{ApplicationStorage, Created, StorageError};
use crate::session::{Identity, IdentityError, IdentityProvider, SessionIdentityProvider};
use crate::storage::MemoryKeyValueStore;

pub(super) fn identity() -> Identity {
    Identity {
        id: "user-7".to_string(),
        login_email: "jane@x.com".to_string(),
    }
}

pub(super) fn signed_in() -> Arc<SessionIdentityProvider> {
    Arc::new(SessionIdentityProvider::signed_in(identity()))
}

pub(super) fn signed_out() -> Arc<SessionIdentityProvider> {
    Arc::new(SessionIdentityProvider::signed_out())
}

pub(super) fn memory_store() -> Arc<MemoryKeyValueStore> {
    Arc::new(MemoryKeyValueStore::new())
}

/// A draft that passes every step, with the optional numbers left unset where allowed.
pub(super) fn complete_draft() -> Draft {
    Draft {
        personal_details: PersonalDetails {
            name: "Jane".to_string(),
            age: Some(34),
            email: "jane@x.com".to_string(),
        },
        income: vec![IncomeEntry {
            source: "Salary".to_string(),
            amount: NumericField::Value(5200.0),
            date: "2025-01-31".to_string(),
        }],
        expenses: vec![ExpenseEntry {
            description: "Rent".to_string(),
            amount: NumericField::Value(1800.0),
            date: "2025-01-03".to_string(),
        }],
        assets: vec![AssetEntry {
            description: "Savings".to_string(),
            value: NumericField::Value(25000.0),
        }],
        liabilities: vec![LiabilityEntry {
            description: "Car loan".to_string(),
            amount: NumericField::Value(12000.0),
        }],
    }
}

pub(super) fn stored_record(id: &str) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(id.to_string()),
        body: ApplicationPayload::from_draft(&complete_draft()),
    }
}

/// Storage whose every call fails as if the backend were down.
#[derive(Debug, Default)]
pub(super) struct UnavailableStorage {
    calls: AtomicUsize,
}

impl UnavailableStorage {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Network("connection refused".to_string()))
    }
}

#[async_trait]
impl ApplicationStorage for UnavailableStorage {
    async fn create_application(
        &self,
        _payload: ApplicationPayload,
    ) -> Result<Created, StorageError> {
        self.fail()
    }

    async fn list_applications(
        &self,
        _email: &str,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        self.fail()
    }

    async fn get_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<ApplicationRecord, StorageError> {
        self.fail()
    }

    async fn update_application(
        &self,
        _id: &ApplicationId,
        _payload: ApplicationPayload,
    ) -> Result<ApplicationRecord, StorageError> {
        self.fail()
    }

    async fn delete_application(&self, _id: &ApplicationId) -> Result<(), StorageError> {
        self.fail()
    }
}

/// Identity provider that cannot be reached.
pub(super) struct BrokenIdentity;

#[async_trait]
impl IdentityProvider for BrokenIdentity {
    async fn current_identity(&self) -> Result<Identity, IdentityError> {
        Err(IdentityError::Unavailable("timeout".to_string()))
    }
}

pub(super) async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
