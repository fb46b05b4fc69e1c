//! Deployment bundle assembly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use charmgen_core::charm_ref::SERIES;
use charmgen_core::{CharmReference, Release};

use crate::error::ResolveResult;
use crate::relations::RelationGroup;
use crate::selector::ResolvedContext;

/// Everything a deployer needs to stand up one release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentBundle {
    pub series: String,
    /// Instance name → charm reference.
    pub services: IndexMap<String, CharmReference>,
    pub relations: Vec<RelationGroup>,
}

impl DeploymentBundle {
    /// Wrap the bundle under its deployment name, the shape deployers expect
    /// at the top of a bundle file.
    pub fn into_document(self, deployment: &str) -> IndexMap<String, DeploymentBundle> {
        IndexMap::from([(deployment.to_string(), self)])
    }
}

/// Combine the release's services with an already merged relation graph.
///
/// Services sharing an instance name collapse to the last one listed.
pub fn assemble_bundle(release: &Release, relations: Vec<RelationGroup>) -> DeploymentBundle {
    let mut services = IndexMap::new();
    for service in &release.topology.services {
        let resolved = service.id.resolve();
        let charm = CharmReference::build(&resolved.reference)
            .with_constraints(service.constraints.clone());
        services.insert(resolved.instance_name, charm);
    }

    DeploymentBundle {
        series: SERIES.to_string(),
        services,
        relations,
    }
}

impl ResolvedContext<'_> {
    /// Build the full deployment bundle. Fails if any locally generated
    /// service has no registry entry.
    pub fn build_deployment(&self) -> ResolveResult<DeploymentBundle> {
        for service in self.local_services() {
            self.service_entry(&service.id)?;
        }
        let relations = self.build_relations()?;
        Ok(assemble_bundle(self.release(), relations))
    }
}
