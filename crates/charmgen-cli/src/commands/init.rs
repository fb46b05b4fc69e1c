use std::path::Path;

use anyhow::{Context, bail};
use charmgen_core::CatalogConfig;

pub fn init(path: &Path, name: &str) -> anyhow::Result<()> {
    let output = path.join("charmgen.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let config = CatalogConfig::scaffold(name);
    std::fs::write(&output, config.to_toml_string()?)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
