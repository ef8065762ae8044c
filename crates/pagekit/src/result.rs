//! Result and error types for pagekit.

use thiserror::Error;

/// Result type for pagekit operations
pub type PagekitResult<T> = Result<T, PagekitError>;

/// Errors that can occur while driving the UI
#[derive(Debug, Error)]
pub enum PagekitError {
    /// A locator step did not match anything at resolution time
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Description of the locator chain that failed
        locator: String,
    },

    /// A wait or poll exceeded its budget
    #[error("Timed out after {ms}ms waiting for {waited_for} (last observed: {last_observed})")]
    Timeout {
        /// Budget in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
        /// Last value the predicate observed
        last_observed: String,
    },

    /// The remote driver reported a failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// The locator table has no entry for a component key
    #[error("No locator `{key}` for component `{component}`")]
    LocatorMissing {
        /// Component name (e.g. `ContextMenu`)
        component: String,
        /// Locator key inside the component
        key: String,
    },

    /// No locator table is known for the requested application version
    #[error("No locator table for version {version}")]
    UnknownVersion {
        /// Requested version
        version: String,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
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

impl PagekitError {
    /// Create a driver error from any displayable failure
    #[must_use]
    pub fn driver(message: impl std::fmt::Display) -> Self {
        Self::Driver {
            message: message.to_string(),
        }
    }

    /// Create a not-found error for a locator description
    #[must_use]
    pub fn not_found(locator: impl Into<String>) -> Self {
        Self::ElementNotFound {
            locator: locator.into(),
        }
    }

    /// Whether this error means "the element is absent"
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Whether this error is a wait budget running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(PagekitError::not_found("#x").is_not_found());
        assert!(!PagekitError::not_found("#x").is_timeout());

        let timeout = PagekitError::Timeout {
            ms: 100,
            waited_for: "menu".into(),
            last_observed: "false".into(),
        };
        assert!(timeout.is_timeout());
        assert!(!PagekitError::driver("boom").is_not_found());
    }

    #[test]
    fn test_timeout_message_names_last_value() {
        let err = PagekitError::Timeout {
            ms: 5000,
            waited_for: "item count to settle".into(),
            last_observed: "7".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("5000ms"));
        assert!(msg.contains("last observed: 7"));
    }

    #[test]
    fn test_locator_missing_message() {
        let err = PagekitError::LocatorMissing {
            component: "ContextMenu".into(),
            key: "itemRow".into(),
        };
        assert_eq!(err.to_string(), "No locator `itemRow` for component `ContextMenu`");
    }
}
