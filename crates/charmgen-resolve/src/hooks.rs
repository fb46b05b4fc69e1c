//! Lifecycle hooks and the hook entry point of a generated charm.

use charmgen_core::ServiceIdentifier;

use crate::error::ResolveResult;
use crate::metadata::ServiceMetadata;
use crate::selector::ResolvedContext;

/// Hooks every charm implements regardless of its relations.
pub const LIFECYCLE_HOOKS: [&str; 5] = ["start", "stop", "config-changed", "upgrade-charm", "install"];

const RELATION_EVENTS: [&str; 3] = ["changed", "joined", "broken"];

/// File name of the script every hook symlink points at.
pub const ENTRY_POINT: &str = "entry.py";

/// Hook names for a charm: the lifecycle set, then
/// `<name>-relation-{changed,joined,broken}` per relation.
pub fn build_hooks(metadata: &ServiceMetadata) -> Vec<String> {
    let mut hooks: Vec<String> = LIFECYCLE_HOOKS.iter().map(|h| h.to_string()).collect();
    for name in metadata.relation_names() {
        for event in RELATION_EVENTS {
            hooks.push(format!("{name}-relation-{event}"));
        }
    }
    hooks
}

/// Source of the entry point script that dispatches every hook of `service_key`.
pub fn build_entry(service_key: &str) -> String {
    format!(
        "#!/usr/bin/env python2.7\n\
         from cloudfoundry.jobs import job_manager\n\
         job_manager(\"{service_key}\")"
    )
}

impl ResolvedContext<'_> {
    pub fn build_hooks(&self, id: &ServiceIdentifier) -> ResolveResult<Vec<String>> {
        Ok(build_hooks(&self.build_metadata(id)?))
    }
}
