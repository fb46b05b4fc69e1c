use std::path::Path;

use charmgen_resolve::select_from_catalog;

use super::load_catalog;

pub fn generate(config: &Path, dir: &Path, version: &str) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let ctx = select_from_catalog(&catalog, version)?;
    let report = charmgen_emit::generate(&ctx, &catalog.deployment, dir)?;

    println!("✓ Generated release {} ({} charms)", ctx.version(), report.charm_dirs.len());
    for charm in &report.charm_dirs {
        println!("  Charm:  {}", charm.display());
    }
    println!("  Bundle: {}", report.bundle_path.display());
    println!("  SHA256: {}", report.bundle_sha256);
    Ok(())
}
