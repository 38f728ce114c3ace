//! Error types for the test harness

use thiserror::Error;

/// Result type alias used throughout the harness and the suites
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context}: expected status {expected}, got {actual}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        context: String,
    },

    #[error("{context}: missing or empty field `{field}` in response body")]
    MissingField { field: String, context: String },

    #[error("{context}: response body does not contain {needle:?}")]
    BodyMismatch { needle: String, context: String },

    #[error("Invalid fixture transition: {from} -> {to}")]
    Lifecycle { from: String, to: String },

    #[error("Fixture setup failed: {0}")]
    Setup(String),

    #[error("Report recorder error: {0}")]
    Report(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl HarnessError {
    /// Whether this error came out of an assertion on a response, as opposed
    /// to transport or harness plumbing. Useful when a suite wants to report
    /// the two differently.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            HarnessError::UnexpectedStatus { .. }
                | HarnessError::MissingField { .. }
                | HarnessError::BodyMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_carries_both_codes() {
        let err = HarnessError::UnexpectedStatus {
            expected: 201,
            actual: 404,
            context: "create user".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("201"));
        assert!(msg.contains("404"));
        assert!(msg.contains("create user"));
        assert!(err.is_assertion());
    }

    #[test]
    fn lifecycle_error_names_both_states() {
        let err = HarnessError::Lifecycle {
            from: "disposed".to_string(),
            to: "running".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid fixture transition: disposed -> running"
        );
        assert!(!err.is_assertion());
    }
}
