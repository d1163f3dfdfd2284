use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::Draft;
use crate::storage::KeyValueStore;

pub const DRAFT_KEY: &str = "createApplicationDraft";

/// Mirrors the wizard draft into durable storage. Every failure is logged and swallowed.
pub struct DraftPersistence<K: ?Sized> {
    store: Arc<K>,
}

impl<K: ?Sized> Clone for DraftPersistence<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K> DraftPersistence<K>
where
    K: KeyValueStore + ?Sized,
{
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    pub fn save(&self, draft: &Draft) {
        let encoded = match serde_json::to_string(draft) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "failed to encode application draft");
                return;
            }
        };

        if let Err(err) = self.store.set(DRAFT_KEY, &encoded) {
            warn!(error = %err, "failed to persist application draft");
        }
    }

    /// `None` when nothing is stored or the stored value cannot be read back.
    pub fn load(&self) -> Option<Draft> {
        let raw = match self.store.get(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read application draft");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(draft) => {
                debug!("restored application draft");
                Some(draft)
            }
            Err(err) => {
                warn!(error = %err, "ignoring malformed application draft");
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.delete(DRAFT_KEY) {
            warn!(error = %err, "failed to clear application draft");
        }
    }
}
