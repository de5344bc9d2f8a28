//! Protected namespaces and name classification
//!
//! `ProtectedNamespaceSet` holds the namespace prefixes whose types must
//! never be resolvable from sandboxed scripts. The set is immutable once
//! built, so it is shared freely across threads behind an `Arc`.

use crate::error::{Result, SandboxError};
use crate::name::QualifiedName;
use std::sync::{Arc, OnceLock};

static GLOBAL_NAMESPACES: OnceLock<Arc<ProtectedNamespaceSet>> = OnceLock::new();

/// Immutable set of protected namespace prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedNamespaceSet {
    /// Sorted, deduplicated prefixes
    prefixes: Vec<QualifiedName>,
}

impl ProtectedNamespaceSet {
    /// Build a set from already-parsed prefixes
    pub fn new(prefixes: impl IntoIterator<Item = QualifiedName>) -> Self {
        let mut prefixes: Vec<QualifiedName> = prefixes.into_iter().collect();
        prefixes.sort();
        prefixes.dedup();
        Self { prefixes }
    }

    /// Parse and build a set from dotted prefix strings
    pub fn parse<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = prefixes
            .into_iter()
            .map(|p| QualifiedName::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(parsed))
    }

    /// True if `name` equals or is nested under any protected prefix
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.prefixes.iter().any(|prefix| name.is_nested_under(prefix))
    }

    /// Iterate over the protected prefixes in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &QualifiedName> {
        self.prefixes.iter()
    }

    /// Number of protected prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// True if nothing is protected
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Install the process-wide namespace set.
    ///
    /// May be called once, at engine startup, before any gateway built from
    /// [`ProtectedNamespaceSet::global`] is reachable. Later calls fail.
    pub fn install_global(set: ProtectedNamespaceSet) -> Result<Arc<ProtectedNamespaceSet>> {
        let count = set.len();
        let installed = Arc::new(set);
        GLOBAL_NAMESPACES
            .set(installed.clone())
            .map_err(|_| {
                SandboxError::Config("Protected namespace set is already installed".to_string())
            })?;

        tracing::info!(prefixes = count, "Protected namespace set installed");
        Ok(installed)
    }

    /// The process-wide namespace set, if one has been installed
    pub fn global() -> Option<Arc<ProtectedNamespaceSet>> {
        GLOBAL_NAMESPACES.get().cloned()
    }
}

/// Result of classifying a qualified name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Inside a protected namespace
    Protected,
    /// Outside every protected namespace
    Ordinary,
}

/// Classifies names against a protected namespace set
#[derive(Debug, Clone)]
pub struct NamespaceClassifier {
    namespaces: Arc<ProtectedNamespaceSet>,
}

impl NamespaceClassifier {
    /// Create a classifier over a shared namespace set
    pub fn new(namespaces: Arc<ProtectedNamespaceSet>) -> Self {
        Self { namespaces }
    }

    /// Classify a parsed name
    pub fn classify(&self, name: &QualifiedName) -> Classification {
        if self.namespaces.contains(name) {
            Classification::Protected
        } else {
            Classification::Ordinary
        }
    }

    /// Parse then classify; malformed input fails before classification
    pub fn classify_raw(&self, raw: &str) -> Result<Classification> {
        let name = QualifiedName::parse(raw)?;
        Ok(self.classify(&name))
    }

    /// The namespace set this classifier consults
    pub fn namespaces(&self) -> &ProtectedNamespaceSet {
        &self.namespaces
    }
}
