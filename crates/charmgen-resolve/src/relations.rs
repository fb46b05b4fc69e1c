//! Relation graph — explicit topology relations merged with relations implied
//! by matching provides/requires declarations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use charmgen_core::{ExplicitRelation, RelationEndpoint, ResolvedIdentifier, ServiceRegistry};

use crate::error::ResolveResult;
use crate::selector::{ResolvedContext, lookup};

/// All right-hand endpoints related to one left-hand endpoint.
///
/// Serializes as `[lhs, [rhs, ...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGroup(pub String, pub Vec<String>);

impl RelationGroup {
    pub fn lhs(&self) -> &str {
        &self.0
    }

    pub fn rhs(&self) -> &[String] {
        &self.1
    }
}

/// Pair every provided relation with the same-named required relation of
/// every other service in `services`.
///
/// This is a full services × jobs × relations scan; topologies are small.
pub fn implicit_relations(
    registry: &ServiceRegistry,
    services: &[ResolvedIdentifier],
) -> ResolveResult<Vec<(RelationEndpoint, RelationEndpoint)>> {
    let entries = services
        .iter()
        .map(|s| lookup(registry, &s.reference).map(|entry| (s, entry)))
        .collect::<ResolveResult<Vec<_>>>()?;

    let mut pairs = Vec::new();
    for (i, (provider, provider_entry)) in entries.iter().enumerate() {
        for job in &provider_entry.jobs {
            for provided in &job.provides {
                for (j, (consumer, consumer_entry)) in entries.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let consumers = consumer_entry
                        .jobs
                        .iter()
                        .flat_map(|job| &job.requires)
                        .filter(|required| required.name == provided.name);
                    for required in consumers {
                        debug!(
                            provider = %provider.instance_name,
                            consumer = %consumer.instance_name,
                            relation = %required.name,
                            "implicit relation"
                        );
                        pairs.push((
                            RelationEndpoint::new(provider.instance_name.as_str(), provided.name.as_str()),
                            RelationEndpoint::new(consumer.instance_name.as_str(), required.name.as_str()),
                        ));
                    }
                }
            }
        }
    }
    Ok(pairs)
}

/// Group `(lhs, rhs)` pairs by lhs, keeping first-seen lhs order and every
/// rhs in insertion order (duplicates included).
pub fn group_by_lhs(pairs: impl IntoIterator<Item = (String, String)>) -> Vec<RelationGroup> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for (lhs, rhs) in pairs {
        groups.entry(lhs).or_default().push(rhs);
    }
    groups
        .into_iter()
        .map(|(lhs, rhs)| RelationGroup(lhs, rhs))
        .collect()
}

/// Merge explicit relations with implicit ones derived from `services`.
pub fn merge_relations(
    explicit: &[ExplicitRelation],
    registry: &ServiceRegistry,
    services: &[ResolvedIdentifier],
) -> ResolveResult<Vec<RelationGroup>> {
    let explicit = explicit
        .iter()
        .map(|ExplicitRelation(lhs, rhs)| (lhs.normalize(), rhs.normalize()));
    let implicit = implicit_relations(registry, services)?
        .into_iter()
        .map(|(lhs, rhs)| (lhs.to_string(), rhs.to_string()));

    Ok(group_by_lhs(explicit.chain(implicit)))
}

impl ResolvedContext<'_> {
    /// The merged relation graph of the selected release.
    pub fn build_relations(&self) -> ResolveResult<Vec<RelationGroup>> {
        let services: Vec<ResolvedIdentifier> =
            self.local_services().map(|s| s.id.resolve()).collect();
        merge_relations(&self.release().topology.relations, self.registry(), &services)
    }
}
