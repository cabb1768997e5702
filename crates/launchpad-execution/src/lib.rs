//! Generation execution: the sequential orchestrator, its retry policy and
//! the mounted session that ties them to the state store.

pub mod orchestrator;
pub mod retry;
pub mod session;

pub use orchestrator::{GenerationOrchestrator, RunOutcome};
pub use retry::RetryPolicy;
pub use session::{GenerationSession, SessionDependencies};
