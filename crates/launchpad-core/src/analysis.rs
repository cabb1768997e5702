//! Analysis service boundary.
//!
//! The analysis service is the LLM-backed collaborator that turns startup
//! input into one report's text.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::report::ReportType;
use crate::startup::StartupInput;

/// Failure of a single analysis call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The provider throttled the request.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// The request failed (transport or non-success status).
    #[error("Analysis request failed: {message}")]
    Request {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// The provider answered but the payload was unusable.
    #[error("Invalid analysis response: {0}")]
    InvalidResponse(String),

    /// The whole step, retries included, exceeded its hard timeout.
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
}

impl AnalysisError {
    pub fn request(message: impl Into<String>, is_retryable: bool) -> Self {
        Self::Request {
            status_code: None,
            message: message.into(),
            is_retryable,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Request { is_retryable, .. } => *is_retryable,
            Self::InvalidResponse(_) | Self::Timeout(_) => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Provider supplied back-off hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Generates report text for a report type.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(
        &self,
        report_type: ReportType,
        input: &StartupInput,
    ) -> Result<String, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(AnalysisError::rate_limited("slow down").is_retryable());
        assert!(AnalysisError::request("connection reset", true).is_retryable());
        assert!(!AnalysisError::request("bad request", false).is_retryable());
        assert!(!AnalysisError::Timeout(Duration::from_secs(90)).is_retryable());
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        let err = AnalysisError::RateLimited {
            message: "429".into(),
            retry_after: Some(Duration::from_secs(4)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(4)));
        assert!(AnalysisError::request("boom", true).retry_after().is_none());
    }
}
