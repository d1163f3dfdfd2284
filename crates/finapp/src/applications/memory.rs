use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::domain::{ApplicationId, ApplicationPayload, ApplicationRecord};
use super::repository::{ApplicationStorage, Created, StorageError};

/// Process-local storage backing the development server and tests.
#[derive(Debug)]
pub struct InMemoryApplicationStorage {
    records: Mutex<BTreeMap<ApplicationId, ApplicationRecord>>,
    sequence: AtomicU64,
}

impl Default for InMemoryApplicationStorage {
    fn default() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            sequence: AtomicU64::new(1),
        }
    }
}

impl InMemoryApplicationStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ApplicationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ApplicationId(format!("app-{id:06}"))
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<ApplicationId, ApplicationRecord>>, StorageError>
    {
        self.records
            .lock()
            .map_err(|_| StorageError::Unavailable("storage mutex poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ApplicationStorage for InMemoryApplicationStorage {
    async fn create_application(
        &self,
        payload: ApplicationPayload,
    ) -> Result<Created, StorageError> {
        let id = self.next_id();
        let record = ApplicationRecord {
            id: id.clone(),
            body: payload,
        };
        self.lock()?.insert(id.clone(), record);
        Ok(Created { id })
    }

    async fn list_applications(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .values()
            .filter(|record| record.body.personal_details.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationRecord, StorageError> {
        self.lock()?.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: ApplicationPayload,
    ) -> Result<ApplicationRecord, StorageError> {
        let mut guard = self.lock()?;
        let record = guard.get_mut(id).ok_or(StorageError::NotFound)?;
        record.body = payload;
        Ok(record.clone())
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), StorageError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
