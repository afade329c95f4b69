//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the vserver group domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::GroupId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Validation errors raised when constructing a spec or binding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("vserver group name must not be empty")]
    EmptyName,
    #[error("load balancer id must not be empty")]
    EmptyLoadBalancerId,
    #[error("backend port must be in 1..=65535, got {0}")]
    PortOutOfRange(u16),
    #[error("backend server id must not be empty")]
    EmptyServerId,
}

/// A single backend routing target within a vserver group.
///
/// Identity is the (server_id, port, weight) triple, with the server id
/// compared case-insensitively. Field names serialize to the provider's
/// PascalCase wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackendBinding {
    /// ECS instance id of the backend server
    pub server_id: String,
    /// Port the backend listens on
    pub port: u16,
    /// Relative routing weight
    pub weight: u32,
}

impl BackendBinding {
    /// Create a binding, validating the server id and port range.
    pub fn new(server_id: impl Into<String>, port: u16, weight: u32) -> Result<Self, SpecError> {
        let server_id = server_id.into();
        if server_id.is_empty() {
            return Err(SpecError::EmptyServerId);
        }
        if port == 0 {
            return Err(SpecError::PortOutOfRange(port));
        }
        Ok(Self {
            server_id,
            port,
            weight,
        })
    }

    /// Deterministic fingerprint used for set-membership comparison.
    ///
    /// CRC32 over the lowercased server id, port and weight. Two bindings
    /// differing only in server id casing fingerprint identically; a port
    /// or weight change yields a different value. Not a security hash.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(self.server_id.to_lowercase().as_bytes());
        hasher.update(b"-");
        hasher.update(self.port.to_string().as_bytes());
        hasher.update(b"-");
        hasher.update(self.weight.to_string().as_bytes());
        hasher.update(b"-");
        hasher.finalize()
    }
}

impl PartialEq for BackendBinding {
    fn eq(&self, other: &Self) -> bool {
        self.server_id.to_lowercase() == other.server_id.to_lowercase()
            && self.port == other.port
            && self.weight == other.weight
    }
}

impl Eq for BackendBinding {}

impl Hash for BackendBinding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server_id.to_lowercase().hash(state);
        self.port.hash(state);
        self.weight.hash(state);
    }
}

/// Serialize bindings to the provider's opaque BackendServers string:
/// a JSON array of {ServerId, Port, Weight} objects.
///
/// Output is sorted so the same set always produces the same string.
pub fn backend_servers_json(bindings: &[BackendBinding]) -> serde_json::Result<String> {
    let mut sorted: Vec<&BackendBinding> = bindings.iter().collect();
    sorted.sort_by(|a, b| {
        (a.server_id.to_lowercase(), a.port, a.weight)
            .cmp(&(b.server_id.to_lowercase(), b.port, b.weight))
    });
    serde_json::to_string(&sorted)
}

/// Declared desired state for a vserver group.
///
/// Strongly-typed replacement for a loosely-typed schema dictionary:
/// required fields and port ranges are validated at construction.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub name: String,
    pub load_balancer_id: String,
    pub bindings: HashSet<BackendBinding>,
}

impl GroupSpec {
    pub fn new(
        name: impl Into<String>,
        load_balancer_id: impl Into<String>,
        bindings: Vec<BackendBinding>,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        let load_balancer_id = load_balancer_id.into();
        if load_balancer_id.is_empty() {
            return Err(SpecError::EmptyLoadBalancerId);
        }
        Ok(Self {
            name,
            load_balancer_id,
            bindings: bindings.into_iter().collect(),
        })
    }
}

/// Observed/persisted state of a vserver group.
///
/// `id == None` means the resource is absent remotely, either because it
/// was never created or because a read found it gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupState {
    pub id: Option<GroupId>,
    pub name: String,
    pub load_balancer_id: String,
    pub bindings: HashSet<BackendBinding>,
}

impl GroupState {
    /// Fresh state for a spec that has not been materialized remotely yet.
    pub fn new(spec: &GroupSpec) -> Self {
        Self {
            id: None,
            name: spec.name.clone(),
            load_balancer_id: spec.load_balancer_id.clone(),
            bindings: HashSet::new(),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_none()
    }

    /// Drop the remote identity so callers treat the resource as deleted.
    pub fn clear_id(&mut self) {
        self.id = None;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn binding(server_id: &str, port: u16, weight: u32) -> BackendBinding {
        BackendBinding::new(server_id, port, weight).unwrap()
    }

    // ===== BackendBinding Tests =====

    #[test]
    fn test_binding_rejects_port_zero() {
        assert_eq!(
            BackendBinding::new("i-1", 0, 50),
            Err(SpecError::PortOutOfRange(0))
        );
    }

    #[test]
    fn test_binding_rejects_empty_server_id() {
        assert_eq!(BackendBinding::new("", 80, 50), Err(SpecError::EmptyServerId));
    }

    #[test]
    fn test_fingerprint_case_insensitive_server_id() {
        let a = binding("I-ABC123", 80, 50);
        let b = binding("i-abc123", 80, 50);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_port() {
        let a = binding("i-1", 80, 50);
        let b = binding("i-1", 8080, 50);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_weight() {
        let a = binding("i-1", 80, 50);
        let b = binding("i-1", 80, 100);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = binding("i-1", 80, 50);
        assert_eq!(a.fingerprint(), binding("i-1", 80, 50).fingerprint());
    }

    #[test]
    fn test_binding_set_membership_ignores_case() {
        let mut set = HashSet::new();
        set.insert(binding("I-1", 80, 50));
        assert!(set.contains(&binding("i-1", 80, 50)));
        assert!(!set.contains(&binding("i-1", 81, 50)));
    }

    #[test]
    fn test_binding_wire_field_names() {
        let json = serde_json::to_string(&binding("i-1", 80, 50)).unwrap();
        assert_eq!(json, r#"{"ServerId":"i-1","Port":80,"Weight":50}"#);
    }

    #[test]
    fn test_backend_servers_json_sorted() {
        let bindings = vec![binding("i-2", 8080, 100), binding("i-1", 80, 50)];
        let json = backend_servers_json(&bindings).unwrap();
        assert_eq!(
            json,
            r#"[{"ServerId":"i-1","Port":80,"Weight":50},{"ServerId":"i-2","Port":8080,"Weight":100}]"#
        );
    }

    // ===== GroupSpec Tests =====

    #[test]
    fn test_spec_requires_name() {
        let err = GroupSpec::new("", "lb-1", vec![]).unwrap_err();
        assert_eq!(err, SpecError::EmptyName);
    }

    #[test]
    fn test_spec_requires_load_balancer_id() {
        let err = GroupSpec::new("web", "", vec![]).unwrap_err();
        assert_eq!(err, SpecError::EmptyLoadBalancerId);
    }

    #[test]
    fn test_spec_dedups_bindings() {
        let spec = GroupSpec::new(
            "web",
            "lb-1",
            vec![binding("i-1", 80, 50), binding("I-1", 80, 50)],
        )
        .unwrap();
        assert_eq!(spec.bindings.len(), 1);
    }

    // ===== GroupState Tests =====

    #[test]
    fn test_state_starts_absent() {
        let spec = GroupSpec::new("web", "lb-1", vec![binding("i-1", 80, 50)]).unwrap();
        let state = GroupState::new(&spec);
        assert!(state.is_absent());
        assert_eq!(state.name, "web");
        assert_eq!(state.load_balancer_id, "lb-1");
        assert!(state.bindings.is_empty());
    }

    #[test]
    fn test_state_clear_id() {
        let spec = GroupSpec::new("web", "lb-1", vec![]).unwrap();
        let mut state = GroupState::new(&spec);
        state.id = Some(GroupId::new("vsg-1"));
        assert!(!state.is_absent());
        state.clear_id();
        assert!(state.is_absent());
    }

    #[test]
    fn test_state_serde_round_trip() {
        let spec = GroupSpec::new("web", "lb-1", vec![binding("i-1", 80, 50)]).unwrap();
        let mut state = GroupState::new(&spec);
        state.id = Some(GroupId::new("vsg-1"));
        state.bindings.insert(binding("i-1", 80, 50));

        let json = serde_json::to_string(&state).unwrap();
        let back: GroupState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, Some(GroupId::new("vsg-1")));
        assert!(back.bindings.contains(&binding("i-1", 80, 50)));
    }
}
