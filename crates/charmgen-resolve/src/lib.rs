//! charmgen resolver — turns a release catalog into charm and bundle data.
//!
//! Nothing here touches the filesystem. Callers select a release with
//! [`select_release`] and then ask the returned [`ResolvedContext`] for
//! per-service artifacts or the whole deployment bundle; writing those out
//! is `charmgen-emit`'s job.
//!
//! # Components
//!
//! - **`selector`** — Release selection and the resolved context
//! - **`metadata`** — Per-service charm metadata (requires/provides)
//! - **`hooks`** — Lifecycle hook names and the hook entry point script
//! - **`relations`** — Explicit + implicit relation graph merging
//! - **`bundle`** — Deployment bundle assembly

pub mod bundle;
pub mod error;
pub mod hooks;
pub mod metadata;
pub mod relations;
pub mod selector;

#[cfg(test)]
mod fixtures;

pub use bundle::{DeploymentBundle, assemble_bundle};
pub use error::{ResolveError, ResolveResult};
pub use hooks::{ENTRY_POINT, LIFECYCLE_HOOKS, build_entry, build_hooks};
pub use metadata::{AUTHOR, InterfaceSpec, RelationMap, ServiceMetadata, build_metadata};
pub use relations::{RelationGroup, group_by_lhs, implicit_relations, merge_relations};
pub use selector::{RequestedVersion, ResolvedContext, select_from_catalog, select_release};
