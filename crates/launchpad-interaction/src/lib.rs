//! Analysis service implementations.

pub mod claude_analysis_service;
pub mod fallback_analysis_service;
pub mod prompts;

pub use claude_analysis_service::ClaudeAnalysisService;
pub use fallback_analysis_service::FallbackAnalysisService;
pub use prompts::PromptRenderer;
