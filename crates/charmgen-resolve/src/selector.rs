//! Release selection.
//!
//! Picking a release yields a [`ResolvedContext`], an immutable view over the
//! matched release and the service registry. Every later resolution step is
//! a method on that context.

use std::fmt;

use charmgen_core::{CatalogConfig, Release, ServiceIdentifier, ServiceRegistry, ServiceRegistryEntry, TopologyService};
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};

/// A version as given by a caller: either already numeric or a string that
/// must parse as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedVersion {
    Number(u64),
    Text(String),
}

impl RequestedVersion {
    /// The numeric version, or `None` for an integer no release range can
    /// hold (negative or wider than `u64`).
    pub fn to_number(&self) -> ResolveResult<Option<u64>> {
        match self {
            RequestedVersion::Number(n) => Ok(Some(*n)),
            RequestedVersion::Text(s) => {
                let text = s.trim();
                let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ResolveError::InvalidVersion(s.clone()));
                }
                Ok(text.parse::<i128>().ok().and_then(|n| u64::try_from(n).ok()))
            }
        }
    }
}

impl From<u64> for RequestedVersion {
    fn from(n: u64) -> Self {
        RequestedVersion::Number(n)
    }
}

impl From<u32> for RequestedVersion {
    fn from(n: u32) -> Self {
        RequestedVersion::Number(u64::from(n))
    }
}

impl From<&str> for RequestedVersion {
    fn from(s: &str) -> Self {
        RequestedVersion::Text(s.to_string())
    }
}

impl From<String> for RequestedVersion {
    fn from(s: String) -> Self {
        RequestedVersion::Text(s)
    }
}

impl fmt::Display for RequestedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedVersion::Number(n) => write!(f, "{n}"),
            RequestedVersion::Text(s) => f.write_str(s),
        }
    }
}

/// The matched release plus everything needed to resolve it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedContext<'a> {
    release: &'a Release,
    version: u64,
    registry: &'a ServiceRegistry,
}

/// Select the first release in catalog order whose range contains `version`.
pub fn select_release<'a>(
    releases: &'a [Release],
    registry: &'a ServiceRegistry,
    version: impl Into<RequestedVersion>,
) -> ResolveResult<ResolvedContext<'a>> {
    let requested = version.into();
    let (version, release) = requested
        .to_number()?
        .and_then(|v| releases.iter().find(|r| r.versions.contains(v)).map(|r| (v, r)))
        .ok_or_else(|| ResolveError::ReleaseNotFound(requested.to_string().trim().to_string()))?;

    debug!(version, range = %release.versions, "selected release");

    Ok(ResolvedContext {
        release,
        version,
        registry,
    })
}

/// [`select_release`] over a loaded catalog file.
pub fn select_from_catalog(
    catalog: &CatalogConfig,
    version: impl Into<RequestedVersion>,
) -> ResolveResult<ResolvedContext<'_>> {
    select_release(&catalog.releases, &catalog.services, version)
}

impl<'a> ResolvedContext<'a> {
    pub fn release(&self) -> &'a Release {
        self.release
    }

    /// The requested version, which may lie anywhere inside the release range.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn registry(&self) -> &'a ServiceRegistry {
        self.registry
    }

    /// Registry entry of a locally generated service.
    pub fn service_entry(&self, id: &ServiceIdentifier) -> ResolveResult<&'a ServiceRegistryEntry> {
        lookup(self.registry, id.reference())
    }

    /// Topology services whose charms this tool generates (everything not
    /// hosted in the charm store).
    pub fn local_services(&self) -> impl Iterator<Item = &'a TopologyService> + 'a {
        self.release
            .topology
            .services
            .iter()
            .filter(|s| !s.id.is_store())
    }
}

pub(crate) fn lookup<'r>(
    registry: &'r ServiceRegistry,
    key: &str,
) -> ResolveResult<&'r ServiceRegistryEntry> {
    registry
        .get(key)
        .ok_or_else(|| ResolveError::ServiceNotFound(key.to_string()))
}
