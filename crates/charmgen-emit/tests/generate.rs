//! End-to-end generation tests.
//!
//! Runs a full generation pass over the shared fixture catalog and checks
//! the resulting tree on disk.

use std::path::Path;

use charmgen_core::{CatalogConfig, DeploymentConfig, Release, ServiceIdentifier, Topology, TopologyService, VersionRange};
use charmgen_emit::generate;
use charmgen_resolve::{ResolveError, select_from_catalog, select_release};
use walkdir::WalkDir;

fn catalog() -> CatalogConfig {
    CatalogConfig::parse(include_str!("../../../tests/fixtures/release1.toml")).unwrap()
}

fn support_tree(root: &Path) {
    std::fs::create_dir_all(root.join("hooks/cloudfoundry")).unwrap();
    std::fs::create_dir_all(root.join("hooks/charmhelpers")).unwrap();
    std::fs::create_dir_all(root.join("files")).unwrap();
    std::fs::write(root.join("hooks/cloudfoundry/__init__.py"), "").unwrap();
    std::fs::write(root.join("hooks/cloudfoundry/jobs.py"), "def job_manager(key): pass\n").unwrap();
    std::fs::write(root.join("hooks/charmhelpers/__init__.py"), "").unwrap();
}

/// Hook links in `hooks/`, without the entry point or support packages.
fn hook_names(charm_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(charm_dir.join("hooks"))
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "entry.py" && name != "cloudfoundry" && name != "charmhelpers")
        .collect();
    names.sort();
    names
}

#[test]
fn test_generate() {
    let catalog = catalog();
    let ctx = select_from_catalog(&catalog, 173u64).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let support = tempfile::tempdir().unwrap();
    support_tree(support.path());
    let deployment = catalog.deployment.clone().with_support_dir(support.path());
    let report = generate(&ctx, &deployment, dir.path()).unwrap();

    assert!(dir.path().join("bundles.yaml").exists());
    assert_eq!(report.bundle_path, dir.path().join("bundles.yaml"));
    assert_eq!(report.bundle_sha256.len(), 64);

    let trusty = dir.path().join("trusty");
    assert!(trusty.join("cloud_controller_v1").is_dir());
    assert!(trusty.join("nats-v1").is_dir());
    assert!(trusty.join("uaa_v1").is_dir());
    // Store charms are fetched by the deployer, not generated.
    assert!(!trusty.join("mysql").exists());
    assert_eq!(report.charm_dirs.len(), 3);

    // 5 lifecycle hooks + 3 per relation (nats, orchestrator)
    let hooks = hook_names(&trusty.join("nats-v1"));
    assert_eq!(hooks.len(), 5 + 3 * 2);
    assert!(hooks.iter().any(|h| h == "nats-relation-broken"));

    // Every charm carries the runtime its entry point imports.
    for charm in &report.charm_dirs {
        assert!(charm.join("hooks/cloudfoundry").is_dir());
        assert!(charm.join("hooks/cloudfoundry/jobs.py").is_file());
        assert!(charm.join("hooks/charmhelpers").is_dir());
        assert!(charm.join("files").is_dir());
    }
}

#[test]
fn test_generate_missing_support_dir_writes_nothing() {
    let catalog = catalog();
    let ctx = select_from_catalog(&catalog, 173u64).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let deployment = DeploymentConfig::new("cf").with_support_dir(dir.path().join("absent"));
    let err = generate(&ctx, &deployment, &out).unwrap_err();
    assert!(err.to_string().contains("support directory"));
    assert!(!out.exists());
}

#[test]
fn test_generate_open_and_bounded_releases() {
    let catalog = catalog();
    let dir = tempfile::tempdir().unwrap();

    let ctx = select_from_catalog(&catalog, "165").unwrap();
    let report = generate(&ctx, &DeploymentConfig::new("cf"), dir.path()).unwrap();
    let names: Vec<_> = report
        .charm_dirs
        .iter()
        .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["nats-v1", "cloud_controller_v1"]);

    let bundle = std::fs::read_to_string(&report.bundle_path).unwrap();
    assert!(bundle.starts_with("cf:"));
}

#[test]
fn test_generate_missing_service() {
    let releases = vec![Release {
        versions: VersionRange::bounded(1, 1),
        topology: Topology {
            services: vec![TopologyService::new(ServiceIdentifier::pair("missing", "??"))],
            relations: vec![],
        },
    }];
    let registry = Default::default();
    let ctx = select_release(&releases, &registry, 1u64).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = generate(&ctx, &DeploymentConfig::default(), dir.path()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ResolveError>(),
        Some(&ResolveError::ServiceNotFound("missing".into()))
    );
    // Nothing is written when resolution fails.
    assert_eq!(WalkDir::new(dir.path()).min_depth(1).into_iter().count(), 0);
}
