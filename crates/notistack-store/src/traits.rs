//! Store trait definitions

use notistack_api::StackEntry;

use crate::StoreResult;

/// Key-value substrate the stack is persisted into
pub trait Store: Send + Sync {
    /// Read the value under `key`, if any
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value in one step.
    /// Implementations must never expose a state where the key is missing.
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. No-op if absent.
    fn delete(&self, key: &str) -> StoreResult<()>;

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Load and save the ordered stack as one snapshot
pub trait StackPersistence: Send + Sync {
    /// Load the persisted stack. Empty if nothing has been stored.
    fn load(&self) -> StoreResult<Vec<StackEntry>>;

    /// Replace the persisted stack with `entries`
    fn save(&self, entries: &[StackEntry]) -> StoreResult<()>;
}
