//! Errors produced while parsing or building a DSN.
//!
//! Errors fall into two classes:
//! - **structural**: the string cannot be decomposed (bad port, bad escape,
//!   unparseable typed parameter)
//! - **semantic**: the string decomposes but a mandatory field is empty
//!   after defaulting
//!
//! ```rust
//! use snowflake_dsn::{Config, DsnError};
//!
//! let err = Config::parse("user:pass@/db").unwrap_err();
//! assert!(matches!(err, DsnError::EmptyAccount));
//! assert!(err.is_semantic());
//! ```

use thiserror::Error;

/// Errors that can occur while parsing, building or validating a DSN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DsnError {
    /// The account name is empty after defaulting.
    #[error("account is empty")]
    EmptyAccount,

    /// The user name is empty after defaulting.
    #[error("user is empty")]
    EmptyUsername,

    /// The password is empty after defaulting.
    #[error("password is empty")]
    EmptyPassword,

    /// The port in a `host:port` target is not a decimal integer.
    #[error("failed to parse port: {0:?}")]
    InvalidPort(String),

    /// A percent-encoded value contains a malformed escape sequence.
    #[error("invalid percent escape in {0:?}")]
    InvalidEscape(String),

    /// A typed query parameter could not be parsed.
    #[error("invalid value {value:?} for parameter '{key}': {message}")]
    InvalidParameter {
        key: String,
        value: String,
        message: String,
    },

    /// Environment variable not found.
    #[error("environment variable not found: {0}")]
    EnvNotFound(String),

    /// Invalid environment variable value.
    #[error("invalid environment variable '{name}': {message}")]
    InvalidEnvValue { name: String, message: String },
}

impl DsnError {
    /// Create an invalid-parameter error.
    pub fn invalid_parameter(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// True when the input could not be decomposed into DSN segments.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidPort(_) | Self::InvalidEscape(_) | Self::InvalidParameter { .. }
        )
    }

    /// True when a mandatory field was missing after defaulting.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Self::EmptyAccount | Self::EmptyUsername | Self::EmptyPassword
        )
    }
}

/// Result type for DSN operations.
pub type DsnResult<T> = Result<T, DsnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(DsnError::EmptyAccount.is_semantic());
        assert!(DsnError::EmptyPassword.is_semantic());
        assert!(!DsnError::EmptyUsername.is_structural());

        assert!(DsnError::InvalidPort("x".into()).is_structural());
        assert!(DsnError::InvalidEscape("%zz".into()).is_structural());
        assert!(DsnError::invalid_parameter("loginTimeout", "abc", "not an integer").is_structural());

        let env = DsnError::EnvNotFound("SNOWFLAKE_DSN".into());
        assert!(!env.is_structural());
        assert!(!env.is_semantic());
    }

    #[test]
    fn test_error_messages() {
        let err = DsnError::InvalidPort("44x".into());
        assert_eq!(err.to_string(), "failed to parse port: \"44x\"");

        let err = DsnError::invalid_parameter("insecureMode", "maybe", "not a boolean");
        assert!(err.to_string().contains("insecureMode"));
        assert!(err.to_string().contains("maybe"));
    }
}
