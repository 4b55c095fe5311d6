//! Error types for introspection requests

use thiserror::Error;
use tracing::debug;

/// Result type for introspection operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failure reported by a backend call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The requested entity, automation or script does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Any other backend failure, carrying the backend's message
    #[error("{0}")]
    Request(String),

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline passed
    #[error("request timed out")]
    TimedOut,
}

impl BackendError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Cancellation and timeouts end the whole request, whatever stage they hit
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut)
    }
}

/// Errors surfaced to the caller of an introspection operation
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing, empty or malformed parameter; no backend calls were made
    #[error("{0}")]
    Validation(String),

    #[error("failed to get entity state: {0}")]
    EntityFetch(#[source] BackendError),

    #[error("failed to get automation: {0}")]
    AutomationFetch(#[source] BackendError),

    #[error("failed to get automation: {0} has no configuration")]
    MissingConfig(String),

    #[error("failed to get script: {0}")]
    ScriptFetch(#[source] BackendError),

    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    TimedOut,

    /// The structured result could not be serialized
    #[error("failed to format result: {0}")]
    Format(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a failed mandatory fetch with its stage; aborts keep their own variant
    pub(crate) fn mandatory(err: BackendError, stage: fn(BackendError) -> Self) -> Self {
        match err {
            BackendError::Cancelled => Self::Cancelled,
            BackendError::TimedOut => Self::TimedOut,
            other => stage(other),
        }
    }

    /// Convert the error of a context check, which only ever reports aborts
    pub(crate) fn aborted(err: BackendError) -> Self {
        match err {
            BackendError::Cancelled => Self::Cancelled,
            _ => Self::TimedOut,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Apply the optional-category policy to a backend result.
///
/// Failures are logged and become `None`; cancellation and timeouts still
/// end the request.
pub(crate) fn optional<T>(
    result: Result<T, BackendError>,
    category: &'static str,
) -> AnalysisResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_abort() => Err(AnalysisError::aborted(err)),
        Err(err) => {
            debug!(category, error = %err, "Optional category unavailable, skipping");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandatory_messages_carry_stage() {
        let err = AnalysisError::mandatory(
            BackendError::NotFound("light.nope".into()),
            AnalysisError::EntityFetch,
        );
        assert_eq!(err.to_string(), "failed to get entity state: light.nope not found");

        let err = AnalysisError::mandatory(
            BackendError::request("connection refused"),
            AnalysisError::ScriptFetch,
        );
        assert_eq!(err.to_string(), "failed to get script: connection refused");
    }

    #[test]
    fn test_mandatory_keeps_aborts() {
        let err = AnalysisError::mandatory(BackendError::Cancelled, AnalysisError::AutomationFetch);
        assert!(matches!(err, AnalysisError::Cancelled));
    }

    #[test]
    fn test_optional_policy() {
        assert_eq!(optional(Ok::<_, BackendError>(3), "scenes").unwrap(), Some(3));
        assert_eq!(
            optional::<u8>(Err(BackendError::request("boom")), "scenes").unwrap(),
            None
        );
        assert!(matches!(
            optional::<u8>(Err(BackendError::TimedOut), "scenes"),
            Err(AnalysisError::TimedOut)
        ));
    }
}
