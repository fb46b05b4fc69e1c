//! Service identifier normalization and charm reference resolution.

use serde::{Deserialize, Serialize};

/// Prefix of charms hosted in the charm store.
pub const STORE_PREFIX: &str = "cs:";

/// Series every generated charm and bundle targets.
pub const SERIES: &str = "trusty";

/// How a topology entry names its service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceIdentifier {
    /// `cloud_controller_v1`
    PlainKey(String),
    /// `cs:trusty/mysql`: the part after the first `/` names the instance.
    PathKey(String),
    /// `("cloud_controller_v1", "cc")`: reference plus explicit instance name.
    ExplicitPair { reference: String, instance: String },
}

/// Canonical `(reference, default name, instance name)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    pub reference: String,
    pub default_name: String,
    pub instance_name: String,
}

impl ServiceIdentifier {
    /// Classify a bare identifier string.
    pub fn parse(id: &str) -> Self {
        if id.contains('/') {
            ServiceIdentifier::PathKey(id.to_string())
        } else {
            ServiceIdentifier::PlainKey(id.to_string())
        }
    }

    pub fn pair(reference: impl Into<String>, instance: impl Into<String>) -> Self {
        ServiceIdentifier::ExplicitPair {
            reference: reference.into(),
            instance: instance.into(),
        }
    }

    /// The charm reference, which is also the registry key of local charms.
    pub fn reference(&self) -> &str {
        match self {
            ServiceIdentifier::PlainKey(id) | ServiceIdentifier::PathKey(id) => id,
            ServiceIdentifier::ExplicitPair { reference, .. } => reference,
        }
    }

    /// Whether the charm comes from the store rather than being generated locally.
    pub fn is_store(&self) -> bool {
        self.reference().starts_with(STORE_PREFIX)
    }

    pub fn resolve(&self) -> ResolvedIdentifier {
        match self {
            ServiceIdentifier::PlainKey(id) => ResolvedIdentifier {
                reference: id.clone(),
                default_name: id.clone(),
                instance_name: id.clone(),
            },
            ServiceIdentifier::PathKey(id) => {
                let name = id.split_once('/').map_or(id.as_str(), |(_, rest)| rest);
                ResolvedIdentifier {
                    reference: id.clone(),
                    default_name: name.to_string(),
                    instance_name: name.to_string(),
                }
            }
            ServiceIdentifier::ExplicitPair {
                reference,
                instance,
            } => ResolvedIdentifier {
                reference: reference.clone(),
                default_name: reference
                    .rsplit('/')
                    .next()
                    .unwrap_or(reference)
                    .to_string(),
                instance_name: instance.clone(),
            },
        }
    }
}

/// A service entry in a release topology.
///
/// Accepted catalog forms: `"key"`, `["reference", "instance"]`, or
/// `{ charm = "reference", name = "instance", constraints = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TopologyServiceSpec", into = "TopologyServiceSpec")]
pub struct TopologyService {
    pub id: ServiceIdentifier,
    /// Deployment constraints copied into the bundle, e.g. `root-disk=10G`.
    pub constraints: Option<String>,
}

impl TopologyService {
    pub fn new(id: ServiceIdentifier) -> Self {
        Self {
            id,
            constraints: None,
        }
    }

    pub fn with_constraints(mut self, constraints: impl Into<String>) -> Self {
        self.constraints = Some(constraints.into());
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TopologyServiceSpec {
    Key(String),
    Pair(String, String),
    Detailed {
        charm: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<String>,
    },
}

impl From<TopologyServiceSpec> for TopologyService {
    fn from(spec: TopologyServiceSpec) -> Self {
        match spec {
            TopologyServiceSpec::Key(id) => Self::new(ServiceIdentifier::parse(&id)),
            TopologyServiceSpec::Pair(reference, instance) => {
                Self::new(ServiceIdentifier::pair(reference, instance))
            }
            TopologyServiceSpec::Detailed {
                charm,
                name,
                constraints,
            } => Self {
                id: match name {
                    Some(instance) => ServiceIdentifier::pair(charm, instance),
                    None => ServiceIdentifier::parse(&charm),
                },
                constraints,
            },
        }
    }
}

impl From<TopologyService> for TopologyServiceSpec {
    fn from(service: TopologyService) -> Self {
        match (service.id, service.constraints) {
            (ServiceIdentifier::PlainKey(id) | ServiceIdentifier::PathKey(id), None) => {
                TopologyServiceSpec::Key(id)
            }
            (
                ServiceIdentifier::ExplicitPair {
                    reference,
                    instance,
                },
                None,
            ) => TopologyServiceSpec::Pair(reference, instance),
            (ServiceIdentifier::PlainKey(id) | ServiceIdentifier::PathKey(id), constraints) => {
                TopologyServiceSpec::Detailed {
                    charm: id,
                    name: None,
                    constraints,
                }
            }
            (
                ServiceIdentifier::ExplicitPair {
                    reference,
                    instance,
                },
                constraints,
            ) => TopologyServiceSpec::Detailed {
                charm: reference,
                name: Some(instance),
                constraints,
            },
        }
    }
}

/// Where a bundle service gets its charm from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharmSource {
    Store,
    Local,
}

/// Bundle entry describing how the deployer obtains a service's charm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmReference {
    pub charm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
}

impl CharmReference {
    /// Store charms are referenced as-is; anything else is a charm this tool
    /// generates locally for the `trusty` series.
    pub fn build(reference: &str) -> Self {
        let branch = if reference.starts_with(STORE_PREFIX) {
            None
        } else {
            Some(format!("local:{SERIES}/{reference}"))
        };
        Self {
            charm: reference.to_string(),
            branch,
            constraints: None,
        }
    }

    pub fn with_constraints(mut self, constraints: Option<String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn source(&self) -> CharmSource {
        if self.branch.is_some() {
            CharmSource::Local
        } else {
            CharmSource::Store
        }
    }
}
