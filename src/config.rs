//! Sandbox configuration
//!
//! Supplies the protected namespace prefixes and audit settings. Loaded
//! once at engine startup, either from a JSON file or built in code.

use crate::error::{Result, SandboxError};
use crate::namespace::ProtectedNamespaceSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namespaces protected when no configuration is supplied
pub const DEFAULT_PROTECTED_NAMESPACES: &[&str] =
    &["engine.internal", "engine.dynalink", "engine.tools"];

/// Main sandbox configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxConfig {
    /// Dotted namespace prefixes that scripts may never resolve
    #[serde(default = "default_protected_namespaces")]
    pub protected_namespaces: Vec<String>,

    /// Maximum retained audit entries (0 disables the audit log)
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_protected_namespaces() -> Vec<String> {
    DEFAULT_PROTECTED_NAMESPACES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_audit_capacity() -> usize {
    1000
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            protected_namespaces: default_protected_namespaces(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl SandboxConfig {
    /// Configuration protecting exactly the given prefixes
    pub fn with_namespaces<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_namespaces: prefixes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SandboxConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SandboxError::Config(format!(
                "Failed to read sandbox config {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&json).map_err(|e| {
            SandboxError::Config(format!(
                "Failed to parse sandbox config {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            prefixes = config.protected_namespaces.len(),
            "Sandbox config loaded"
        );
        Ok(config)
    }

    /// Check that every prefix is a well-formed dotted name
    pub fn validate(&self) -> Result<()> {
        self.build_namespace_set().map(|_| ())
    }

    /// Build the immutable namespace set from this configuration
    pub fn build_namespace_set(&self) -> Result<ProtectedNamespaceSet> {
        ProtectedNamespaceSet::parse(&self.protected_namespaces).map_err(|e| {
            SandboxError::Config(format!("Invalid protected namespace: {}", e))
        })
    }
}
