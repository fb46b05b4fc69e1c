//! Catalog validation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("version range must be [low] or [low, high] with low <= high, got {0:?}")]
    InvalidRange(Vec<u64>),

    #[error("relation in service {service} has an empty name or interface")]
    EmptyRelation { service: String },

    #[error("service {service} declares relation {relation} twice in its {kind}")]
    DuplicateRelation {
        service: String,
        relation: String,
        kind: &'static str,
    },

    #[error("release {index} lists an empty service identifier")]
    EmptyService { index: usize },

    /// Local charms are generated into `<series>/<reference>`, so the
    /// reference must be a single path segment.
    #[error("release {index} lists local charm {reference:?}; only store (cs:) references may contain '/'")]
    LocalPathReference { index: usize, reference: String },

    #[error("service key {0:?} must not contain '/'")]
    InvalidServiceKey(String),
}
