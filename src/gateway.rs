//! Type resolution entry points
//!
//! Two distinct types resolve host types:
//!
//! - [`TypeResolutionGateway`]: the sandboxed path handed to script code.
//!   Every request is parsed, classified and checked against the access
//!   policy before the type system is consulted.
//! - [`HostTypeResolver`]: the privileged path for engine bootstrap code.
//!   It never consults the policy and can only be built with a
//!   [`HostCapability`].
//!
//! There is no flag that turns one into the other.

use crate::audit::{AuditEntry, AuditLog};
use crate::config::SandboxConfig;
use crate::error::{Result, SandboxError};
use crate::name::QualifiedName;
use crate::namespace::{NamespaceClassifier, ProtectedNamespaceSet};
use crate::policy::{AccessPolicy, CallerContext, Decision};
use crate::type_system::{TypeHandle, TypeSystem};
use std::sync::Arc;

/// Sandboxed entry point for dynamic type resolution
pub struct TypeResolutionGateway {
    classifier: NamespaceClassifier,
    policy: AccessPolicy,
    types: Arc<dyn TypeSystem>,
    audit: Arc<AuditLog>,
}

impl TypeResolutionGateway {
    /// Create a gateway over a namespace set and a type system
    pub fn new(namespaces: Arc<ProtectedNamespaceSet>, types: Arc<dyn TypeSystem>) -> Self {
        Self {
            classifier: NamespaceClassifier::new(namespaces),
            policy: AccessPolicy::new(),
            types,
            audit: Arc::new(AuditLog::default()),
        }
    }

    /// Create a gateway from configuration
    pub fn from_config(config: &SandboxConfig, types: Arc<dyn TypeSystem>) -> Result<Self> {
        let namespaces = Arc::new(config.build_namespace_set()?);
        let audit = Arc::new(AuditLog::new(config.audit_capacity));
        Ok(Self::new(namespaces, types).with_audit_log(audit))
    }

    /// Create a gateway over the process-wide namespace set
    pub fn from_global(types: Arc<dyn TypeSystem>) -> Result<Self> {
        let namespaces = ProtectedNamespaceSet::global().ok_or_else(|| {
            SandboxError::Config("Protected namespace set has not been installed".to_string())
        })?;
        Ok(Self::new(namespaces, types))
    }

    /// Share an audit log with other components
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Evaluate classification and policy without looking anything up
    pub fn check(&self, raw_name: &str, caller: &CallerContext) -> Result<Decision> {
        let name = QualifiedName::parse(raw_name)?;
        Ok(self.decide(&name, caller))
    }

    /// Resolve a type on behalf of sandboxed code.
    ///
    /// The access check completes before the type system is consulted, so a
    /// denial looks the same whether or not the protected type exists.
    pub async fn resolve(&self, raw_name: &str, caller: &CallerContext) -> Result<TypeHandle> {
        let name = QualifiedName::parse(raw_name)?;

        if let Decision::Deny { name } = self.decide(&name, caller) {
            tracing::warn!(
                name = %name,
                trust = %caller.trust,
                origin = %caller.origin_label(),
                "Type access denied"
            );
            self.audit.log(AuditEntry::denied(name.to_string(), caller));
            return Err(SandboxError::SecurityFailure {
                name: name.to_string(),
            });
        }

        match self.types.lookup(&name).await? {
            Some(handle) => {
                tracing::debug!(name = %name, id = %handle.id(), "Type resolved");
                Ok(handle)
            }
            None => {
                tracing::debug!(name = %name, backend = self.types.name(), "Type not found");
                Err(SandboxError::TypeNotFound(name.to_string()))
            }
        }
    }

    /// Resolve and return a tagged outcome instead of a `Result`
    pub async fn resolve_outcome(&self, raw_name: &str, caller: &CallerContext) -> Resolution {
        self.resolve(raw_name, caller).await.into()
    }

    /// Resolve several names concurrently; each outcome is independent
    pub async fn resolve_all<S: AsRef<str>>(
        &self,
        raw_names: &[S],
        caller: &CallerContext,
    ) -> Vec<Result<TypeHandle>> {
        futures::future::join_all(
            raw_names
                .iter()
                .map(|raw| self.resolve(raw.as_ref(), caller)),
        )
        .await
    }

    /// Denials recorded by this gateway
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// The classifier used by this gateway
    pub fn classifier(&self) -> &NamespaceClassifier {
        &self.classifier
    }

    fn decide(&self, name: &QualifiedName, caller: &CallerContext) -> Decision {
        let classification = self.classifier.classify(name);
        self.policy.decide(name, classification, caller)
    }
}

/// Tagged result of a sandboxed resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Access allowed and the type exists
    Allowed(TypeHandle),
    /// Access denied by the policy
    Denied { name: String },
    /// The requested name was malformed
    Invalid { name: String, reason: String },
    /// Access allowed but no such type exists
    NotFound { name: String },
    /// The type system failed
    Failed(String),
}

impl Resolution {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Resolution::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Resolution::Denied { .. })
    }
}

impl From<Result<TypeHandle>> for Resolution {
    fn from(result: Result<TypeHandle>) -> Self {
        match result {
            Ok(handle) => Resolution::Allowed(handle),
            Err(SandboxError::SecurityFailure { name }) => Resolution::Denied { name },
            Err(SandboxError::InvalidNameFormat { name, reason }) => {
                Resolution::Invalid { name, reason }
            }
            Err(SandboxError::TypeNotFound(name)) => Resolution::NotFound { name },
            Err(other) => Resolution::Failed(other.to_string()),
        }
    }
}

/// Proof that the holder is privileged host code.
///
/// Only engine bootstrap should mint one. Script-facing code receives a
/// [`TypeResolutionGateway`] instead and never sees this token.
#[derive(Debug)]
pub struct HostCapability {
    _private: (),
}

impl HostCapability {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for HostCapability {
    fn default() -> Self {
        Self::new()
    }
}

/// Privileged, unguarded type resolver for host code
pub struct HostTypeResolver {
    types: Arc<dyn TypeSystem>,
}

impl HostTypeResolver {
    /// Create a host resolver; requires a [`HostCapability`]
    pub fn new(types: Arc<dyn TypeSystem>, _capability: HostCapability) -> Self {
        Self { types }
    }

    /// Resolve any type, protected or not
    pub async fn resolve(&self, raw_name: &str) -> Result<TypeHandle> {
        let name = QualifiedName::parse(raw_name)?;
        self.types
            .lookup(&name)
            .await?
            .ok_or_else(|| SandboxError::TypeNotFound(name.to_string()))
    }
}

/// Build the sandboxed gateway and the host resolver over one type system.
///
/// Engine bootstrap keeps the `HostTypeResolver` and exposes only the
/// gateway to scripts.
pub fn build_resolvers(
    config: &SandboxConfig,
    types: Arc<dyn TypeSystem>,
) -> Result<(TypeResolutionGateway, HostTypeResolver)> {
    let gateway = TypeResolutionGateway::from_config(config, types.clone())?;
    let host = HostTypeResolver::new(types, HostCapability::new());

    tracing::info!(
        prefixes = gateway.classifier().namespaces().len(),
        audit_capacity = gateway.audit_log().capacity(),
        "Type resolvers built"
    );
    Ok((gateway, host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::type_system::memory::MemoryTypeSystem;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Type system that counts lookups, to prove denials never reach it
    struct CountingTypeSystem {
        inner: MemoryTypeSystem,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl TypeSystem for CountingTypeSystem {
        async fn lookup(&self, name: &QualifiedName) -> Result<Option<TypeHandle>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(name).await
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FailingTypeSystem;

    #[async_trait]
    impl TypeSystem for FailingTypeSystem {
        async fn lookup(&self, _name: &QualifiedName) -> Result<Option<TypeHandle>> {
            Err(SandboxError::TypeSystem("backend offline".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn counting(types: &[&str]) -> Arc<CountingTypeSystem> {
        Arc::new(CountingTypeSystem {
            inner: MemoryTypeSystem::with_types(types).unwrap(),
            lookups: AtomicUsize::new(0),
        })
    }

    fn gateway_over(types: Arc<dyn TypeSystem>) -> TypeResolutionGateway {
        let namespaces =
            Arc::new(ProtectedNamespaceSet::parse(["engine.internal", "engine.dynalink"]).unwrap());
        TypeResolutionGateway::new(namespaces, types)
    }

    #[tokio::test]
    async fn test_resolve_ordinary_type() {
        let types = counting(&["engine.objects.Array"]);
        let gateway = gateway_over(types.clone());

        let handle = gateway
            .resolve("engine.objects.Array", &CallerContext::script())
            .await
            .unwrap();
        assert_eq!(handle.name().to_string(), "engine.objects.Array");
        assert_eq!(types.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denial_never_reaches_type_system() {
        let types = counting(&["engine.internal.codegen.Compiler"]);
        let gateway = gateway_over(types.clone());
        let ctx = CallerContext::script();

        let existing = gateway
            .resolve("engine.internal.codegen.Compiler", &ctx)
            .await
            .unwrap_err();
        let missing = gateway
            .resolve("engine.internal.codegen.Missing", &ctx)
            .await
            .unwrap_err();

        assert_eq!(existing.kind(), ErrorKind::SecurityFailure);
        assert_eq!(missing.kind(), ErrorKind::SecurityFailure);
        assert_eq!(types.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_denial_identical_whether_or_not_type_exists() {
        let with = gateway_over(counting(&["engine.dynalink.CallSiteDescriptor"]));
        let without = gateway_over(counting(&[]));
        let ctx = CallerContext::script();

        let a = with
            .resolve("engine.dynalink.CallSiteDescriptor", &ctx)
            .await
            .unwrap_err();
        let b = without
            .resolve("engine.dynalink.CallSiteDescriptor", &ctx)
            .await
            .unwrap_err();

        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn test_invalid_name_fails_before_lookup() {
        let types = counting(&[]);
        let gateway = gateway_over(types.clone());

        let err = gateway
            .resolve("engine..internal", &CallerContext::script())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNameFormat);
        assert_eq!(types.lookups.load(Ordering::SeqCst), 0);
        assert!(gateway.audit_log().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_for_ordinary_name() {
        let gateway = gateway_over(counting(&[]));
        let err = gateway
            .resolve("not.a.real.Type", &CallerContext::script())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeNotFound);
        assert!(!err.is_security_failure());
    }

    #[tokio::test]
    async fn test_type_system_failure_propagates() {
        let gateway = gateway_over(Arc::new(FailingTypeSystem));
        let err = gateway
            .resolve("engine.objects.Array", &CallerContext::script())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeSystem);

        // Denials are still raised without touching the failing backend
        let denied = gateway
            .resolve("engine.internal.Foo", &CallerContext::script())
            .await
            .unwrap_err();
        assert!(denied.is_security_failure());
    }

    #[tokio::test]
    async fn test_denials_are_audited() {
        let gateway = gateway_over(counting(&[]));
        let ctx = CallerContext::script().with_origin("sandbox/internals.js");

        let _ = gateway.resolve("engine.internal.parser.Lexer", &ctx).await;
        let _ = gateway.resolve("engine.objects.Array", &ctx).await;

        let entries = gateway.audit_log().entries_for_origin("sandbox/internals.js");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "engine.internal.parser.Lexer");
    }

    #[test]
    fn test_check_does_not_look_up() {
        let types = counting(&[]);
        let gateway = gateway_over(types.clone());
        let ctx = CallerContext::script();

        assert_eq!(gateway.check("engine.objects.Array", &ctx).unwrap(), Decision::Allow);
        assert!(matches!(
            gateway.check("engine.internal.ir.Node", &ctx).unwrap(),
            Decision::Deny { .. }
        ));
        assert!(gateway.check("", &ctx).is_err());
        assert_eq!(types.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_outcome_is_tagged() {
        let gateway = gateway_over(counting(&["engine.objects.Array"]));
        let ctx = CallerContext::script();

        tokio_test::block_on(async {
            assert!(gateway.resolve_outcome("engine.objects.Array", &ctx).await.is_allowed());
            assert_eq!(
                gateway.resolve_outcome("engine.internal.ir.Node", &ctx).await,
                Resolution::Denied {
                    name: "engine.internal.ir.Node".to_string()
                }
            );
            assert_eq!(
                gateway.resolve_outcome("not.a.real.Type", &ctx).await,
                Resolution::NotFound {
                    name: "not.a.real.Type".to_string()
                }
            );
            assert!(matches!(
                gateway.resolve_outcome("a..b", &ctx).await,
                Resolution::Invalid { .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order() {
        let gateway = gateway_over(counting(&["engine.objects.Array", "engine.objects.Map"]));
        let results = gateway
            .resolve_all(
                &["engine.objects.Array", "engine.internal.Foo", "engine.objects.Map"],
                &CallerContext::script(),
            )
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().is_security_failure());
        assert_eq!(
            results[2].as_ref().unwrap().name().to_string(),
            "engine.objects.Map"
        );
    }

    #[tokio::test]
    async fn test_host_resolver_bypasses_policy() {
        let types: Arc<dyn TypeSystem> =
            Arc::new(MemoryTypeSystem::with_types(["engine.internal.runtime.Context"]).unwrap());
        let host = HostTypeResolver::new(types, HostCapability::new());

        let handle = host.resolve("engine.internal.runtime.Context").await.unwrap();
        assert_eq!(handle.name().simple_name(), "Context");

        let missing = host.resolve("engine.internal.runtime.Missing").await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::TypeNotFound);

        let invalid = host.resolve("engine.internal.").await.unwrap_err();
        assert_eq!(invalid.kind(), ErrorKind::InvalidNameFormat);
    }

    #[tokio::test]
    async fn test_build_resolvers_share_type_system() {
        let types: Arc<dyn TypeSystem> = Arc::new(
            MemoryTypeSystem::with_types(["engine.internal.runtime.Context", "engine.objects.Array"])
                .unwrap(),
        );
        let config = SandboxConfig::with_namespaces(["engine.internal"]);
        let (gateway, host) = build_resolvers(&config, types).unwrap();

        let guarded = gateway
            .resolve("engine.internal.runtime.Context", &CallerContext::host())
            .await
            .unwrap_err();
        assert!(guarded.is_security_failure());

        let privileged = host.resolve("engine.internal.runtime.Context").await.unwrap();
        let ordinary = host.resolve("engine.objects.Array").await.unwrap();
        assert_eq!(privileged.name().to_string(), "engine.internal.runtime.Context");
        assert_eq!(
            gateway
                .resolve("engine.objects.Array", &CallerContext::script())
                .await
                .unwrap(),
            ordinary
        );
    }

    #[test]
    fn test_from_config_rejects_bad_prefix() {
        let config = SandboxConfig::with_namespaces(["engine..internal"]);
        let types: Arc<dyn TypeSystem> = Arc::new(MemoryTypeSystem::new());
        let err = TypeResolutionGateway::from_config(&config, types).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_from_config_audit_capacity() {
        let mut config = SandboxConfig::default();
        config.audit_capacity = 2;
        let types: Arc<dyn TypeSystem> = Arc::new(MemoryTypeSystem::new());
        let gateway = TypeResolutionGateway::from_config(&config, types).unwrap();
        assert_eq!(gateway.audit_log().capacity(), 2);
    }
}
