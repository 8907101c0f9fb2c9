use crate::error::{StorageError, StorageResult};
use regionguard_types::WorldId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag for a world load.
///
/// Clones share the flag. Loads check it between migration steps and
/// while decoding regions; a cancelled load publishes nothing.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// True when both tokens share one flag.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Fails with [`StorageError::Cancelled`] once cancelled.
    pub fn check(&self, world: &WorldId) -> StorageResult<()> {
        if self.is_cancelled() {
            Err(StorageError::Cancelled(world.clone()))
        } else {
            Ok(())
        }
    }
}
