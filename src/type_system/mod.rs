//! Host type system trait, the outbound lookup collaborator
//!
//! The sandbox never knows how host types are actually found. Embedders
//! implement `TypeSystem` over their reflection or class-loading facility
//! and hand it to the gateway.

use crate::error::Result;
use crate::name::QualifiedName;
use async_trait::async_trait;

pub mod memory;

/// Core trait for host type lookup backends
///
/// Implementations only answer "does this type exist, and if so give me a
/// handle for it". Access control happens before a lookup is ever issued.
#[async_trait]
pub trait TypeSystem: Send + Sync {
    /// Look up a type by fully-qualified name
    ///
    /// Returns `Ok(None)` if the type does not exist.
    async fn lookup(&self, name: &QualifiedName) -> Result<Option<TypeHandle>>;

    /// Backend name (e.g., "memory", "reflection")
    fn name(&self) -> &str;
}

/// Opaque reference to a resolved host type
///
/// Owned by whoever received it; the gateway keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    id: String,
    name: QualifiedName,
}

impl TypeHandle {
    /// Create a handle with a fresh identifier (type-<uuid>)
    pub fn new(name: QualifiedName) -> Self {
        Self {
            id: format!("type-{}", uuid::Uuid::new_v4()),
            name,
        }
    }

    /// Backend-assigned identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fully-qualified name of the resolved type
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }
}
