//! # Durable key-value storage
//!
//! The catalog keeps two JSON text entries in a client-scoped key-value store:
//!
//! ```text
//! products       # ordered array of product records
//! productDraft   # the unsaved add-form snapshot (optional)
//! ```
//!
//! Every write replaces the whole value under its key. Backends may enforce a
//! byte quota over all entries together; a write that would exceed it fails
//! with [`StorageError::QuotaExceeded`] and leaves the previous value in place.
//!
//! ## Implementations
//!
//! - [`file::FileStorage`]: one `<key>.json` file per entry in a data directory.
//! - [`memory::MemoryStorage`]: for tests and ephemeral sessions.

use crate::StorageError;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

pub const PRODUCTS_KEY: &str = "products";
pub const DRAFT_KEY: &str = "productDraft";

/// Typical browser local-storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Fails when `others + value_len` would not fit in `quota`.
pub(crate) fn check_quota(key: &str, others: usize, value_len: usize, quota: Option<usize>) -> Result<(), StorageError> {
    match quota {
        Some(quota) if others + value_len > quota => {
            Err(StorageError::QuotaExceeded { key: key.to_string(), needed: others + value_len, quota })
        }
        _ => Ok(()),
    }
}
