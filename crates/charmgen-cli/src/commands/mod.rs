pub mod generate;
pub mod init;
pub mod inspect;

use anyhow::Context;
use charmgen_core::CatalogConfig;
use std::path::Path;
use tracing::debug;

pub(crate) fn load_catalog(path: &Path) -> anyhow::Result<CatalogConfig> {
    let catalog = CatalogConfig::from_file(path).context("failed to load release catalog")?;
    debug!(
        path = %path.display(),
        releases = catalog.releases.len(),
        services = catalog.services.len(),
        "loaded catalog"
    );
    Ok(catalog)
}
