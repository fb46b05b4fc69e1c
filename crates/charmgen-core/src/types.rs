//! Shared types used across charmgen crates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::charm_ref::TopologyService;
use crate::error::CatalogError;

/// Name and interface of the relation every generated charm has to its orchestrator.
pub const ORCHESTRATOR_RELATION: &str = "orchestrator";

/// Registry of service definitions keyed by service key, in declaration order.
pub type ServiceRegistry = IndexMap<String, ServiceRegistryEntry>;

// ── Relations ──────────────────────────────────────────────────────

/// A relation identified by its name and the wire interface it speaks.
///
/// In a catalog file a relation is either a table `{ name, interface }` or a
/// bare string, which uses the same value for both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RelationSpec")]
pub struct RelationDescriptor {
    pub name: String,
    pub interface: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RelationSpec {
    Short(String),
    Full { name: String, interface: String },
}

impl From<RelationSpec> for RelationDescriptor {
    fn from(spec: RelationSpec) -> Self {
        match spec {
            RelationSpec::Short(name) => Self {
                interface: name.clone(),
                name,
            },
            RelationSpec::Full { name, interface } => Self { name, interface },
        }
    }
}

impl RelationDescriptor {
    pub fn new(name: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: interface.into(),
        }
    }

    /// The implicit dependency on the orchestrating control plane.
    pub fn orchestrator() -> Self {
        Self::new(ORCHESTRATOR_RELATION, ORCHESTRATOR_RELATION)
    }
}

/// A concrete `service:relation` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationEndpoint {
    pub service: String,
    pub relation: String,
}

impl RelationEndpoint {
    pub fn new(service: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            relation: relation.into(),
        }
    }
}

impl fmt::Display for RelationEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.relation)
    }
}

/// One side of an explicit topology relation, as written by the topology author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    /// `["service", "relation"]`
    Pair(String, String),
    /// `"service:relation"`, passed through verbatim.
    Named(String),
}

impl Endpoint {
    /// Render the endpoint in `service:relation` form.
    pub fn normalize(&self) -> String {
        match self {
            Endpoint::Pair(service, relation) => {
                RelationEndpoint::new(service.as_str(), relation.as_str()).to_string()
            }
            Endpoint::Named(endpoint) => endpoint.clone(),
        }
    }
}

impl From<RelationEndpoint> for Endpoint {
    fn from(endpoint: RelationEndpoint) -> Self {
        Endpoint::Pair(endpoint.service, endpoint.relation)
    }
}

/// An explicit `(lhs, rhs)` relation listed in a release topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitRelation(pub Endpoint, pub Endpoint);

// ── Services ───────────────────────────────────────────────────────

/// A job run by a service, with the relations it provides and consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<RelationDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<RelationDescriptor>,
}

/// Registry definition of a generated service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRegistryEntry {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

// ── Releases ───────────────────────────────────────────────────────

/// Inclusive range of release versions. `high == None` is unbounded upward.
///
/// Written as `[low]` or `[low, high]` in a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct VersionRange {
    pub low: u64,
    pub high: Option<u64>,
}

impl VersionRange {
    pub fn bounded(low: u64, high: u64) -> Self {
        Self {
            low,
            high: Some(high),
        }
    }

    pub fn open(low: u64) -> Self {
        Self { low, high: None }
    }

    pub fn contains(&self, version: u64) -> bool {
        version >= self.low && self.high.is_none_or(|high| version <= high)
    }
}

impl TryFrom<Vec<u64>> for VersionRange {
    type Error = CatalogError;

    fn try_from(bounds: Vec<u64>) -> Result<Self, Self::Error> {
        match bounds.as_slice() {
            [low] => Ok(Self::open(*low)),
            [low, high] if low <= high => Ok(Self::bounded(*low, *high)),
            _ => Err(CatalogError::InvalidRange(bounds)),
        }
    }
}

impl From<VersionRange> for Vec<u64> {
    fn from(range: VersionRange) -> Self {
        match range.high {
            Some(high) => vec![range.low, high],
            None => vec![range.low],
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.high {
            Some(high) => write!(f, "{}..={}", self.low, high),
            None => write!(f, "{}..", self.low),
        }
    }
}

/// Services and explicit relations that make up one release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub services: Vec<TopologyService>,
    #[serde(default)]
    pub relations: Vec<ExplicitRelation>,
}

/// A versioned snapshot of a deployable topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub versions: VersionRange,
    #[serde(default)]
    pub topology: Topology,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_from_bare_string() {
        let rel: RelationDescriptor = serde_json::from_str(r#""nats""#).unwrap();
        assert_eq!(rel, RelationDescriptor::new("nats", "nats"));
    }

    #[test]
    fn relation_from_table() {
        let rel: RelationDescriptor =
            serde_json::from_str(r#"{"name": "db", "interface": "mysql"}"#).unwrap();
        assert_eq!(rel.name, "db");
        assert_eq!(rel.interface, "mysql");
    }

    #[test]
    fn endpoint_normalize() {
        assert_eq!(Endpoint::Pair("cc".into(), "db".into()).normalize(), "cc:db");
        assert_eq!(Endpoint::Named("cc:db".into()).normalize(), "cc:db");
    }

    #[test]
    fn bounded_range_contains() {
        let range = VersionRange::bounded(153, 172);
        assert!(!range.contains(152));
        assert!(range.contains(153));
        assert!(range.contains(172));
        assert!(!range.contains(173));
    }

    #[test]
    fn open_range_contains() {
        let range = VersionRange::open(173);
        assert!(!range.contains(172));
        assert!(range.contains(173));
        assert!(range.contains(u64::MAX));
    }

    #[test]
    fn range_rejects_bad_bounds() {
        assert!(VersionRange::try_from(vec![]).is_err());
        assert!(VersionRange::try_from(vec![5, 4]).is_err());
        assert!(VersionRange::try_from(vec![1, 2, 3]).is_err());
        assert_eq!(VersionRange::try_from(vec![4, 4]).unwrap(), VersionRange::bounded(4, 4));
    }

    #[test]
    fn explicit_relation_mixed_forms() {
        let rel: ExplicitRelation =
            serde_json::from_str(r#"[["mysql", "db"], "cc:db"]"#).unwrap();
        assert_eq!(rel.0.normalize(), "mysql:db");
        assert_eq!(rel.1.normalize(), "cc:db");
    }
}
