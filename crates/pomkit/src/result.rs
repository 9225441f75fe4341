//! Result and error types for pomkit.
//!
//! Three classes of failure exist:
//!
//! - **Configuration** errors (unsupported HTTP method, missing action parameter,
//!   unknown action or assertion name). Raised immediately, never retried.
//! - **Assertion** failures. Carry either the default message or the scoped
//!   override installed by [`Session::with_failure_message`](crate::Session::with_failure_message).
//! - **Runtime** errors from the driver (timeouts, unknown aliases).
//!
//! Soft lookup misses are not errors: typed accessors log a warning and return `None`.

use thiserror::Error;

/// Result type for pomkit operations
pub type PomResult<T> = Result<T, PomError>;

/// Errors that can occur in pomkit
#[derive(Debug, Error)]
pub enum PomError {
    /// HTTP method not allowed for the declared request
    #[error("Unknown Http method: {method} (component '{component}')")]
    UnsupportedHttpMethod {
        /// Offending method
        method: String,
        /// Component that declared the request
        component: String,
    },

    /// An action was called without its required parameter
    #[error("Missing parameters for '{action}' action.")]
    MissingActionParameter {
        /// Action name
        action: String,
    },

    /// Action name outside the supported set
    #[error("Unsupported action method: {method}")]
    UnsupportedAction {
        /// Action name
        method: String,
    },

    /// Assertion name outside the supported set
    #[error("Unsupported assertion method: {method}")]
    UnsupportedAssertion {
        /// Assertion name
        method: String,
    },

    /// Component was built without a locator but an element operation was requested
    #[error("Component '{component}' has no locator")]
    MissingLocator {
        /// Component name
        component: String,
    },

    /// A child component was dereferenced but does not exist
    #[error("{kind} '{key}' not found")]
    ComponentNotFound {
        /// Expected kind
        kind: String,
        /// Lookup key
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was awaited
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Waiting on an alias that was never registered
    #[error("No intercept registered under alias '@{alias}'")]
    UnknownAlias {
        /// Alias name
        alias: String,
    },

    /// Error reported by the underlying browser driver
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PomError {
    /// Whether this error is a configuration error (fail fast, never retried)
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedHttpMethod { .. }
                | Self::MissingActionParameter { .. }
                | Self::UnsupportedAction { .. }
                | Self::UnsupportedAssertion { .. }
                | Self::MissingLocator { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Whether this error is an assertion failure
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        let err = PomError::UnsupportedHttpMethod {
            method: "PATCH".into(),
            component: "users".into(),
        };
        assert!(err.is_configuration());
        assert!(!err.is_assertion());
        assert_eq!(
            err.to_string(),
            "Unknown Http method: PATCH (component 'users')"
        );
    }

    #[test]
    fn test_missing_parameter_message() {
        let err = PomError::MissingActionParameter {
            action: "type".into(),
        };
        assert_eq!(err.to_string(), "Missing parameters for 'type' action.");
    }

    #[test]
    fn test_assertion_classification() {
        let err = PomError::AssertionFailed {
            message: "nope".into(),
        };
        assert!(err.is_assertion());
        assert!(!err.is_configuration());
    }
}
