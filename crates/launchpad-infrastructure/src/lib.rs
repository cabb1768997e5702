pub mod config_service;
pub mod generation_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::generation_repository::{KvFinalReportsRepository, KvGenerationStateRepository};
pub use crate::storage::{FileKeyValueStore, InMemoryKeyValueStore};
