//! Resolver error types.

use thiserror::Error;

/// Errors raised while resolving a release topology.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    /// The version is an integer, but no release range contains it.
    #[error("no release matches version {0}")]
    ReleaseNotFound(String),

    #[error("service not found in registry: {0}")]
    ServiceNotFound(String),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
