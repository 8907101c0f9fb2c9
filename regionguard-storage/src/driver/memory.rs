use super::RegionDriver;
use crate::error::StorageResult;
use parking_lot::RwLock;
use regionguard_types::WorldId;
use serde_json::Value;
use std::collections::BTreeMap;

/// Keeps documents in memory. Useful for tests and for servers that
/// import regions from elsewhere on every start.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    documents: RwLock<BTreeMap<WorldId, Value>>,
}

impl MemoryDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegionDriver for MemoryDriver {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, world: &WorldId) -> StorageResult<Option<Value>> {
        Ok(self.documents.read().get(world).cloned())
    }

    fn write(&self, world: &WorldId, document: &Value) -> StorageResult<()> {
        self.documents.write().insert(world.clone(), document.clone());
        Ok(())
    }

    fn delete(&self, world: &WorldId) -> StorageResult<bool> {
        Ok(self.documents.write().remove(world).is_some())
    }

    fn worlds(&self) -> StorageResult<Vec<WorldId>> {
        Ok(self.documents.read().keys().cloned().collect())
    }
}
