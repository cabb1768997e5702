//! Storage layer for atomic file operations, key-value backends and secrets.

mod atomic_json;
mod file_kv_store;
mod memory_kv_store;
mod secret_storage;

pub use atomic_json::{AtomicFileError, AtomicJsonFile};
pub use file_kv_store::FileKeyValueStore;
pub use memory_kv_store::InMemoryKeyValueStore;
pub use secret_storage::{SecretStorage, SecretStorageError};
