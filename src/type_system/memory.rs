//! In-memory type system for embedding and testing
//!
//! Stores handles in a `HashMap` protected by `RwLock`. Registration is
//! synchronous so it can run during engine bootstrap.

use super::{TypeHandle, TypeSystem};
use crate::error::{Result, SandboxError};
use crate::name::QualifiedName;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory host type registry
#[derive(Default)]
pub struct MemoryTypeSystem {
    /// name → handle
    types: RwLock<HashMap<QualifiedName, TypeHandle>>,
}

impl MemoryTypeSystem {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the given type names
    pub fn with_types<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = Self::new();
        for name in names {
            registry.register(QualifiedName::parse(name.as_ref())?)?;
        }
        Ok(registry)
    }

    /// Register a type, returning its handle.
    ///
    /// Registering an existing name returns the handle already stored.
    pub fn register(&self, name: QualifiedName) -> Result<TypeHandle> {
        let mut types = self.types.write().map_err(|e| {
            SandboxError::TypeSystem(format!("Type registry lock poisoned: {}", e))
        })?;
        let handle = types
            .entry(name.clone())
            .or_insert_with(|| TypeHandle::new(name))
            .clone();
        Ok(handle)
    }

    /// Remove a type; returns true if it was registered
    pub fn unregister(&self, name: &QualifiedName) -> Result<bool> {
        let mut types = self.types.write().map_err(|e| {
            SandboxError::TypeSystem(format!("Type registry lock poisoned: {}", e))
        })?;
        Ok(types.remove(name).is_some())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TypeSystem for MemoryTypeSystem {
    async fn lookup(&self, name: &QualifiedName) -> Result<Option<TypeHandle>> {
        let types = self.types.read().map_err(|e| {
            SandboxError::TypeSystem(format!("Type registry lock poisoned: {}", e))
        })?;
        Ok(types.get(name).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
