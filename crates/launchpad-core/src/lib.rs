pub mod analysis;
pub mod config;
pub mod error;
pub mod generation;
pub mod notification;
pub mod report;
pub mod startup;
pub mod storage;

// Re-export common error type
pub use error::LaunchpadError;
