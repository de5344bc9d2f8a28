//! # a3s-sandbox
//!
//! Type-access sandboxing for dynamic host type resolution.
//!
//! ## Overview
//!
//! Scripts running in the A3S runtime can ask for host types by
//! fully-qualified name. `a3s-sandbox` sits between those requests and the
//! host type system: names inside protected namespaces (the engine's own
//! compiler, parser, linker and bootstrap machinery) are refused with a
//! security failure, everything else is looked up normally.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_sandbox::{build_resolvers, CallerContext, MemoryTypeSystem, SandboxConfig};
//!
//! # async fn example() -> a3s_sandbox::Result<()> {
//! let types = Arc::new(MemoryTypeSystem::with_types([
//!     "engine.objects.Array",
//!     "engine.internal.codegen.Compiler",
//! ])?);
//! let config = SandboxConfig::with_namespaces(["engine.internal", "engine.dynalink"]);
//! let (gateway, _host) = build_resolvers(&config, types)?;
//!
//! let script = CallerContext::script().with_origin("main.js");
//! let array = gateway.resolve("engine.objects.Array", &script).await?;
//! println!("Resolved: {}", array.name());
//!
//! let denied = gateway.resolve("engine.internal.codegen.Compiler", &script).await;
//! assert!(denied.unwrap_err().is_security_failure());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **NamespaceClassifier**: segment-exact prefix matching against the
//!   immutable `ProtectedNamespaceSet`
//! - **AccessPolicy**: protected names are denied, others allowed
//! - **TypeResolutionGateway**: sandboxed entry point for scripts
//! - **HostTypeResolver**: separate privileged entry point for host code
//! - **TypeSystem** trait: the host lookup backend

pub mod audit;
pub mod config;
pub mod error;
pub mod gateway;
pub mod name;
pub mod namespace;
pub mod policy;
pub mod type_system;

// Re-export core types
pub use audit::{AuditEntry, AuditLog};
pub use config::{SandboxConfig, DEFAULT_PROTECTED_NAMESPACES};
pub use error::{ErrorKind, Result, SandboxError};
pub use gateway::{
    build_resolvers, HostCapability, HostTypeResolver, Resolution, TypeResolutionGateway,
};
pub use name::QualifiedName;
pub use namespace::{Classification, NamespaceClassifier, ProtectedNamespaceSet};
pub use policy::{AccessPolicy, CallerContext, Decision, TrustLevel};
pub use type_system::{TypeHandle, TypeSystem};

// Re-export backends for convenience
pub use type_system::memory::MemoryTypeSystem;
