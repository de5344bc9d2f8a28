//! Access policy for sandboxed type resolution
//!
//! Protected names are denied and everything else is allowed. Host code
//! that needs internal types never asks the policy; it goes through
//! [`crate::gateway::HostTypeResolver`].

use crate::name::QualifiedName;
use crate::namespace::Classification;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust level of the code requesting a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Untrusted or semi-trusted script code
    #[default]
    Script,
    /// Engine/host code running with full privileges
    Host,
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustLevel::Script => f.write_str("script"),
            TrustLevel::Host => f.write_str("host"),
        }
    }
}

/// Describes who is asking for a type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    /// Trust level of the requester
    pub trust: TrustLevel,

    /// Optional label for diagnostics (script file, session id, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl CallerContext {
    /// Context for sandboxed script code
    pub fn script() -> Self {
        Self {
            trust: TrustLevel::Script,
            origin: None,
        }
    }

    /// Context for privileged host code
    pub fn host() -> Self {
        Self {
            trust: TrustLevel::Host,
            origin: None,
        }
    }

    /// Attach an origin label
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Origin label, or `"unknown"` when none was given
    pub fn origin_label(&self) -> &str {
        self.origin.as_deref().unwrap_or("unknown")
    }
}

/// Outcome of evaluating the access policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Resolution may proceed
    Allow,
    /// Resolution is refused for the given name
    Deny { name: QualifiedName },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decides whether a classified name may be resolved by a caller
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the policy.
    ///
    /// Protected names are denied whatever the caller's trust level; there
    /// are no per-caller or per-subpath exceptions.
    pub fn decide(
        &self,
        name: &QualifiedName,
        classification: Classification,
        _caller: &CallerContext,
    ) -> Decision {
        match classification {
            Classification::Protected => Decision::Deny { name: name.clone() },
            Classification::Ordinary => Decision::Allow,
        }
    }
}
