use std::time::Duration;
use thiserror::Error;

/// Failure kinds for a capture session.
///
/// Every step of the session maps its failure to exactly one kind so callers
/// can discriminate between a page that never loaded, a selector that never
/// matched, and content that never settled.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Timed out after {waited:?} waiting for selector: {selector}")]
    WaitTimeout { selector: String, waited: Duration },

    #[error("Content not ready after {waited:?}")]
    ContentNotReady { waited: Duration },

    #[error("Screenshot capture failed: {0}")]
    CaptureFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SessionError {
    /// Whether the failure happened before any page interaction took place.
    ///
    /// Launch and configuration failures leave no page-side state behind;
    /// everything else happened inside a live session.
    pub fn is_pre_session(&self) -> bool {
        matches!(
            self,
            SessionError::BrowserLaunchFailed(_)
                | SessionError::ConfigurationError(_)
                | SessionError::InvalidUrl(_)
        )
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}
