use std::sync::Arc;

use tracing::warn;

use super::KeyValueStore;

pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";

/// Display preferences shared by every page, injected instead of read ad hoc from storage.
pub struct UiPreferences<K: ?Sized> {
    store: Arc<K>,
}

impl<K: ?Sized> Clone for UiPreferences<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K> UiPreferences<K>
where
    K: KeyValueStore + ?Sized,
{
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    /// Missing or unreadable values fall back to an expanded sidebar.
    pub fn sidebar_collapsed(&self) -> bool {
        match self.store.get(SIDEBAR_COLLAPSED_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!(error = %err, "failed to read sidebar preference");
                false
            }
        }
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        let value = if collapsed { "true" } else { "false" };
        if let Err(err) = self.store.set(SIDEBAR_COLLAPSED_KEY, value) {
            warn!(error = %err, "failed to persist sidebar preference");
        }
    }

    pub fn toggle_sidebar(&self) -> bool {
        let collapsed = !self.sidebar_collapsed();
        self.set_sidebar_collapsed(collapsed);
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn sidebar_defaults_to_expanded_and_toggles() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let preferences = UiPreferences::new(store.clone());

        assert!(!preferences.sidebar_collapsed());
        assert!(preferences.toggle_sidebar());
        assert_eq!(
            store.get(SIDEBAR_COLLAPSED_KEY).expect("get"),
            Some("true".to_string())
        );
        assert!(!preferences.toggle_sidebar());
    }

    #[test]
    fn unexpected_values_read_as_expanded() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(SIDEBAR_COLLAPSED_KEY, "yes").expect("set");
        assert!(!UiPreferences::new(store).sidebar_collapsed());
    }
}
