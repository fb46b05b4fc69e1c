//! Charm metadata derived from a service's registry definition.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use charmgen_core::{RelationDescriptor, ServiceIdentifier, ServiceRegistryEntry};

use crate::error::ResolveResult;
use crate::selector::ResolvedContext;

/// Author recorded in every generated charm.
pub const AUTHOR: &str = "CloudFoundry Charm Generator <cs:~cf-charmers/cloudfoundry>";

/// Relation name → interface map, in declaration order.
pub type RelationMap = IndexMap<String, InterfaceSpec>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub interface: String,
}

/// Contents of a generated charm's `metadata.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub name: String,
    pub summary: String,
    pub description: String,
    pub author: String,
    pub requires: RelationMap,
    /// Absent rather than empty when no job provides anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provides: Option<RelationMap>,
}

impl ServiceMetadata {
    /// Relation names over provides then requires, each name once.
    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        let provides = self.provides.iter().flat_map(|p| p.keys());
        provides
            .chain(self.requires.keys())
            .map(String::as_str)
            .collect::<IndexSet<&str>>()
            .into_iter()
    }
}

/// Build the metadata of the registry service `key`.
///
/// Every charm requires the orchestrator relation. Job relations are merged
/// by name in job order; a later job redefining a name overwrites the earlier
/// interface in place.
pub fn build_metadata(key: &str, entry: &ServiceRegistryEntry) -> ServiceMetadata {
    let mut requires = RelationMap::new();
    insert(&mut requires, &RelationDescriptor::orchestrator());

    let mut provides = RelationMap::new();
    for job in &entry.jobs {
        for rel in &job.provides {
            insert(&mut provides, rel);
        }
        for rel in &job.requires {
            insert(&mut requires, rel);
        }
    }

    ServiceMetadata {
        name: key.to_string(),
        summary: entry.summary.clone(),
        description: entry.description.clone(),
        author: AUTHOR.to_string(),
        requires,
        provides: (!provides.is_empty()).then_some(provides),
    }
}

fn insert(map: &mut RelationMap, rel: &RelationDescriptor) {
    map.insert(
        rel.name.clone(),
        InterfaceSpec {
            interface: rel.interface.clone(),
        },
    );
}

impl ResolvedContext<'_> {
    /// Metadata for a topology service. Only the reference part of an
    /// explicit pair is used as the registry key.
    pub fn build_metadata(&self, id: &ServiceIdentifier) -> ResolveResult<ServiceMetadata> {
        let entry = self.service_entry(id)?;
        Ok(build_metadata(id.reference(), entry))
    }
}
