//! Application services for the generation pipeline.
//!
//! - `store`: observable, persisted generation state
//! - `completion`: hand-off of finished sessions
//! - `progress`: read-only progress view
//! - `notifier`: channel-backed notification sink

pub mod completion;
pub mod notifier;
pub mod progress;
pub mod store;

pub use completion::CompletionHandler;
pub use notifier::ChannelNotifier;
pub use progress::{GenerationPhase, GenerationProgress, ProgressRow};
pub use store::GenerationStore;
