use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{FixtureData, FixtureError};

/// Shared handle to mutable fixture data.
///
/// Cheap to clone; clones see each other's writes.
#[derive(Clone, Default)]
pub struct FixtureStore {
    data: Arc<RwLock<FixtureData>>,
}

impl FixtureStore {
    #[must_use]
    pub fn new(data: FixtureData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Store seeded with the embedded fixture documents.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] if a document fails to parse.
    pub fn seeded() -> Result<Self, FixtureError> {
        FixtureData::load().map(Self::new)
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, FixtureData> {
        self.data.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, FixtureData> {
        self.data.write().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::ItemId;

    use super::*;

    #[tokio::test]
    async fn test_clones_share_writes() {
        let store = FixtureStore::seeded().unwrap();
        let other = store.clone();
        other.write().await.items.retain(|item| item.id.as_str() != "MCO123456789");
        assert!(store.read().await.item(&ItemId::new("MCO123456789")).is_none());
    }

    #[tokio::test]
    async fn test_default_store_is_empty() {
        let store = FixtureStore::default();
        assert!(store.read().await.items.is_empty());
    }
}
