//! `charmgen metadata` / `charmgen bundle` — print resolved artifacts without
//! writing anything.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use charmgen_core::ServiceIdentifier;
use charmgen_resolve::{ResolvedContext, ServiceMetadata, build_hooks, select_from_catalog};

use super::load_catalog;

#[derive(Serialize)]
struct CharmView {
    metadata: ServiceMetadata,
    hooks: Vec<String>,
}

pub fn metadata(config: &Path, version: &str, service: &str, format: &str) -> Result<()> {
    let catalog = load_catalog(config)?;
    let ctx = select_from_catalog(&catalog, version)?;
    let id = find_service(&ctx, service);
    let metadata = ctx.build_metadata(&id)?;
    let view = CharmView {
        hooks: build_hooks(&metadata),
        metadata,
    };
    println!("{}", render(&view, format)?);
    Ok(())
}

pub fn bundle(config: &Path, version: &str, format: &str) -> Result<()> {
    let catalog = load_catalog(config)?;
    let ctx = select_from_catalog(&catalog, version)?;
    let document = ctx.build_deployment()?.into_document(&catalog.deployment.name);
    println!("{}", render(&document, format)?);
    Ok(())
}

/// Match `service` against the topology's instance names first, then treat
/// it as a registry key.
fn find_service(ctx: &ResolvedContext<'_>, service: &str) -> ServiceIdentifier {
    ctx.release()
        .topology
        .services
        .iter()
        .find(|s| s.id.resolve().instance_name == service)
        .map(|s| s.id.clone())
        .unwrap_or_else(|| ServiceIdentifier::parse(service))
}

fn render<T: Serialize>(value: &T, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_yaml::to_string(value)?),
    }
}
