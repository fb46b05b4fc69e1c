//! charmgen emit — write generated charms and the deployment bundle.
//!
//! Generation is all-or-nothing: every charm and the bundle are resolved in
//! memory first, so a topology referencing an unknown service fails before
//! any file is touched.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

use charmgen_core::DeploymentConfig;
use charmgen_core::charm_ref::SERIES;
use charmgen_resolve::ResolvedContext;

pub mod bundle;
pub mod charm;

pub use bundle::{BUNDLE_FILE, generate_deployment, render_bundle};
pub use charm::{CharmArtifacts, FILES_DIR, HOOKS_DIR, METADATA_FILE, check_support_dir, generate_charm};

#[derive(Debug)]
pub struct GenerateReport {
    /// One directory per locally generated charm.
    pub charm_dirs: Vec<PathBuf>,
    pub bundle_path: PathBuf,
    pub bundle_sha256: String,
}

/// Generate every local charm of the selected release under
/// `<target_dir>/trusty/<service>` plus `<target_dir>/bundles.yaml`.
///
/// The bundle is keyed by `deployment.name`; `deployment.support_dir`, when
/// set, is copied into each charm. Store charms are left to the deployer.
pub fn generate(
    ctx: &ResolvedContext<'_>,
    deployment: &DeploymentConfig,
    target_dir: &Path,
) -> Result<GenerateReport> {
    let support = deployment.support_dir.as_deref();
    if let Some(dir) = support {
        check_support_dir(dir)?;
    }
    let rendered = render_bundle(ctx.build_deployment()?, &deployment.name)?;

    let mut charms: Vec<CharmArtifacts> = Vec::new();
    for service in ctx.local_services() {
        if charms.iter().any(|c| c.key == service.id.reference()) {
            continue;
        }
        charms.push(CharmArtifacts::resolve(ctx, &service.id)?.with_support_dir(support));
    }

    let series_dir = target_dir.join(SERIES);
    let mut charm_dirs = Vec::with_capacity(charms.len());
    for charm in &charms {
        let dir = series_dir.join(&charm.key);
        charm.write(&dir)?;
        charm_dirs.push(dir);
    }

    let bundle_path = bundle::write_bundle(&rendered, target_dir)?;
    let bundle_sha256 = sha256_file(&bundle_path)?;

    info!(
        version = ctx.version(),
        charms = charm_dirs.len(),
        "Generated deployment in {}",
        target_dir.display()
    );

    Ok(GenerateReport {
        charm_dirs,
        bundle_path,
        bundle_sha256,
    })
}

/// Compute SHA-256 hash of a file and return the hex digest.
pub(crate) fn sha256_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let hash = Sha256::digest(&bytes);
    Ok(hex::encode(hash))
}
