//! charmgen.toml catalog parser.
//!
//! A catalog file carries the ordered release list and the service registry
//! that the resolver reads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::charm_ref::{ServiceIdentifier, TopologyService};
use crate::error::CatalogError;
use crate::types::{
    Endpoint, ExplicitRelation, Job, RelationDescriptor, Release, ServiceRegistry,
    ServiceRegistryEntry, Topology, VersionRange,
};

/// Default top-level key of the generated bundle document.
pub const DEFAULT_DEPLOYMENT_NAME: &str = "cloudfoundry";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub services: ServiceRegistry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub name: String,
    /// Runtime payload copied into every generated charm: its `hooks/`
    /// subtree lands next to `entry.py`, its `files/` subtree in the charm's
    /// `files/`. Relative paths are taken from the catalog file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_dir: Option<PathBuf>,
}

impl DeploymentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            support_dir: None,
        }
    }

    pub fn with_support_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.support_dir = Some(dir.into());
        self
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEPLOYMENT_NAME)
    }
}

impl CatalogConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("invalid catalog {}", path.display()))?;
        if let (Some(support), Some(base)) = (config.deployment.support_dir.as_mut(), path.parent()) {
            if support.is_relative() {
                *support = base.join(&*support);
            }
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: CatalogConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the invariants serde can't express on its own.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (index, release) in self.releases.iter().enumerate() {
            if release
                .topology
                .services
                .iter()
                .any(|s| s.id.reference().is_empty())
            {
                return Err(CatalogError::EmptyService { index });
            }
            let nested = release
                .topology
                .services
                .iter()
                .find(|s| !s.id.is_store() && s.id.reference().contains('/'));
            if let Some(service) = nested {
                return Err(CatalogError::LocalPathReference {
                    index,
                    reference: service.id.reference().to_string(),
                });
            }
        }

        for (key, entry) in &self.services {
            if key.contains('/') {
                return Err(CatalogError::InvalidServiceKey(key.clone()));
            }
            for job in &entry.jobs {
                check_relations(key, &job.provides, "provides")?;
                check_relations(key, &job.requires, "requires")?;
            }
        }
        Ok(())
    }

    /// Scaffold a minimal catalog with one open-ended release.
    pub fn scaffold(name: &str) -> Self {
        let mut services = IndexMap::new();
        services.insert(
            "nats".to_string(),
            ServiceRegistryEntry {
                summary: "NATS message bus".to_string(),
                description: "Publish-subscribe messaging for platform components".to_string(),
                jobs: vec![Job {
                    provides: vec![RelationDescriptor::new("nats", "nats")],
                    requires: vec![],
                }],
            },
        );
        services.insert(
            "cloud_controller_v1".to_string(),
            ServiceRegistryEntry {
                summary: "Cloud controller".to_string(),
                description: "Platform API endpoint".to_string(),
                jobs: vec![Job {
                    provides: vec![RelationDescriptor::new("cc", "cloud_controller")],
                    requires: vec![
                        RelationDescriptor::new("nats", "nats"),
                        RelationDescriptor::new("db", "mysql"),
                    ],
                }],
            },
        );

        CatalogConfig {
            deployment: DeploymentConfig::new(name),
            releases: vec![Release {
                versions: VersionRange::open(1),
                topology: Topology {
                    services: vec![
                        TopologyService::new(ServiceIdentifier::parse("nats")),
                        TopologyService::new(ServiceIdentifier::pair("cloud_controller_v1", "cc")),
                        TopologyService::new(ServiceIdentifier::parse("cs:trusty/mysql")),
                    ],
                    relations: vec![ExplicitRelation(
                        Endpoint::Pair("mysql".into(), "db".into()),
                        Endpoint::Pair("cc".into(), "db".into()),
                    )],
                },
            }],
            services,
        }
    }
}

fn check_relations(
    service: &str,
    relations: &[RelationDescriptor],
    kind: &'static str,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for rel in relations {
        if rel.name.is_empty() || rel.interface.is_empty() {
            return Err(CatalogError::EmptyRelation {
                service: service.to_string(),
            });
        }
        if !seen.insert(rel.name.as_str()) {
            return Err(CatalogError::DuplicateRelation {
                service: service.to_string(),
                relation: rel.name.clone(),
                kind,
            });
        }
    }
    Ok(())
}
