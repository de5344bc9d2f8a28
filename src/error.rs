//! Error types for a3s-sandbox

use thiserror::Error;

/// Errors that can occur while resolving host types
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The requested name is not a well-formed qualified type name
    #[error("Invalid type name '{name}': {reason}")]
    InvalidNameFormat { name: String, reason: String },

    /// The requested type lies inside a protected namespace
    ///
    /// The message only repeats the name the caller supplied.
    #[error("Access denied to type '{name}'")]
    SecurityFailure { name: String },

    /// Access was allowed but the host type system has no such type
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// The host type system failed while performing a lookup
    #[error("Type system error: {0}")]
    TypeSystem(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`SandboxError`] for callers that branch on
/// the failure kind rather than on the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidNameFormat,
    SecurityFailure,
    TypeNotFound,
    TypeSystem,
    Config,
}

impl SandboxError {
    /// Structured kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SandboxError::InvalidNameFormat { .. } => ErrorKind::InvalidNameFormat,
            SandboxError::SecurityFailure { .. } => ErrorKind::SecurityFailure,
            SandboxError::TypeNotFound(_) => ErrorKind::TypeNotFound,
            SandboxError::TypeSystem(_) => ErrorKind::TypeSystem,
            SandboxError::Config(_) | SandboxError::Serialization(_) => ErrorKind::Config,
        }
    }

    /// True if this is an access denial
    pub fn is_security_failure(&self) -> bool {
        matches!(self, SandboxError::SecurityFailure { .. })
    }

    pub(crate) fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        SandboxError::InvalidNameFormat {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for sandbox operations
pub type Result<T> = std::result::Result<T, SandboxError>;
