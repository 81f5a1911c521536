//! Result and error types for Recorrer.

use thiserror::Error;

/// Result type for Recorrer operations
pub type RecorrerResult<T> = Result<T, RecorrerError>;

/// Errors that can occur in Recorrer
#[derive(Debug, Error)]
pub enum RecorrerError {
    /// A polled condition never became true within its bound
    #[error("timed out after {timeout_secs}s: {message}")]
    Timeout {
        /// What was being waited for
        message: String,
        /// The configured bound, in seconds
        timeout_secs: u64,
    },

    /// Locator strategy outside the supported set
    #[error("unsupported locator strategy: {strategy}")]
    UnsupportedLocator {
        /// The rejected strategy name, uppercase-normalized
        strategy: String,
    },

    /// No element matched the locator
    #[error("element not found: {locator}")]
    NotFound {
        /// Locator description
        locator: String,
    },

    /// Page object wiring failed (setup is unusable)
    #[error("page object construction failed: {message}")]
    Construction {
        /// Error message
        message: String,
    },

    /// Browser session violation (window bookkeeping, released session, ...)
    #[error("session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Script evaluation failed in the page
    #[error("script execution failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecorrerError {
    /// Timeout error carrying the waited-for description and the bound.
    pub fn timeout(message: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_secs: timeout.as_secs(),
        }
    }

    /// Element-not-found error for a locator description.
    pub fn not_found(locator: impl Into<String>) -> Self {
        Self::NotFound {
            locator: locator.into(),
        }
    }

    /// Page wiring failure.
    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction {
            message: message.into(),
        }
    }

    /// Session-level failure.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Script evaluation failure.
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// True when the error is a wait timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// True when the error is an element-not-found miss.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    mod display_tests {
        use super::*;

        #[test]
        fn timeout_names_the_bound() {
            let err = RecorrerError::timeout("banner never appeared", Duration::from_secs(10));
            let rendered = err.to_string();
            assert!(rendered.contains("10"), "bound missing: {rendered}");
            assert!(rendered.contains("banner never appeared"));
        }

        #[test]
        fn unsupported_locator_names_the_strategy() {
            let err = RecorrerError::UnsupportedLocator {
                strategy: "SHADOW_DOM".to_string(),
            };
            assert_eq!(
                err.to_string(),
                "unsupported locator strategy: SHADOW_DOM"
            );
        }

        #[test]
        fn not_found_names_the_locator() {
            let err = RecorrerError::not_found("ID=jobs-list");
            assert_eq!(err.to_string(), "element not found: ID=jobs-list");
        }
    }

    mod predicate_tests {
        use super::*;

        #[test]
        fn is_timeout_only_for_timeouts() {
            let timeout = RecorrerError::timeout("x", Duration::from_secs(1));
            let miss = RecorrerError::not_found("y");
            assert!(timeout.is_timeout());
            assert!(!miss.is_timeout());
            assert!(miss.is_not_found());
            assert!(!timeout.is_not_found());
        }

        #[test]
        fn io_errors_convert() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
            let err: RecorrerError = io.into();
            assert!(matches!(err, RecorrerError::Io(_)));
        }
    }
}
