//! Generation pipeline domain: progress record, final snapshot and their repositories.

pub mod model;
pub mod repository;

pub use model::{FinalReports, GenerationState};
pub use repository::{FinalReportsRepository, GenerationStateRepository};
