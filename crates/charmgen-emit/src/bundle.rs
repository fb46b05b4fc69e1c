//! Bundle file output.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use charmgen_resolve::{DeploymentBundle, ResolvedContext};

pub const BUNDLE_FILE: &str = "bundles.yaml";

/// Render a bundle as the YAML document deployers consume.
pub fn render_bundle(bundle: DeploymentBundle, deployment: &str) -> Result<String> {
    Ok(serde_yaml::to_string(&bundle.into_document(deployment))?)
}

pub(crate) fn write_bundle(rendered: &str, target_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(target_dir)
        .with_context(|| format!("failed to create {}", target_dir.display()))?;
    let target = target_dir.join(BUNDLE_FILE);
    fs::write(&target, rendered).with_context(|| format!("failed to write {}", target.display()))?;
    info!("Wrote bundle {}", target.display());
    Ok(target)
}

/// Resolve the deployment bundle and write it to `<target_dir>/bundles.yaml`.
pub fn generate_deployment(
    ctx: &ResolvedContext<'_>,
    deployment: &str,
    target_dir: &Path,
) -> Result<PathBuf> {
    let rendered = render_bundle(ctx.build_deployment()?, deployment)?;
    write_bundle(&rendered, target_dir)
}
