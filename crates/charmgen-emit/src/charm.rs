//! Charm directory layout.
//!
//! ```text
//! <charm>/
//!   metadata.yaml
//!   files/                  copied from <support>/files
//!   hooks/
//!     entry.py              executable, dispatches every hook
//!     install -> entry.py
//!     ...
//!     cloudfoundry/         copied from <support>/hooks
//! ```

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use charmgen_core::ServiceIdentifier;
use charmgen_resolve::{ENTRY_POINT, ResolvedContext, ServiceMetadata, build_entry, build_hooks};

pub const METADATA_FILE: &str = "metadata.yaml";
pub const HOOKS_DIR: &str = "hooks";
pub const FILES_DIR: &str = "files";

/// Everything that goes into one charm, resolved before anything is written.
#[derive(Debug, Clone)]
pub struct CharmArtifacts {
    pub key: String,
    pub metadata: ServiceMetadata,
    pub hooks: Vec<String>,
    pub entry: String,
    /// Payload tree whose `hooks/` and `files/` are copied into the charm.
    pub support_dir: Option<PathBuf>,
}

impl CharmArtifacts {
    pub fn resolve(ctx: &ResolvedContext<'_>, id: &ServiceIdentifier) -> Result<Self> {
        let metadata = ctx.build_metadata(id)?;
        let hooks = build_hooks(&metadata);
        Ok(Self {
            key: id.reference().to_string(),
            entry: build_entry(id.reference()),
            metadata,
            hooks,
            support_dir: None,
        })
    }

    pub fn with_support_dir(mut self, dir: Option<&Path>) -> Self {
        self.support_dir = dir.map(Path::to_path_buf);
        self
    }

    /// Write the charm into `target_dir`, creating it if needed. Existing
    /// hook links are replaced. Support files are copied first so generated
    /// files always win over payload files of the same name.
    pub fn write(&self, target_dir: &Path) -> Result<()> {
        fs::create_dir_all(target_dir)
            .with_context(|| format!("failed to create {}", target_dir.display()))?;

        let meta_path = target_dir.join(METADATA_FILE);
        fs::write(&meta_path, serde_yaml::to_string(&self.metadata)?)
            .with_context(|| format!("failed to write {}", meta_path.display()))?;

        let hook_dir = target_dir.join(HOOKS_DIR);
        fs::create_dir_all(&hook_dir)
            .with_context(|| format!("failed to create {}", hook_dir.display()))?;
        let files_dir = target_dir.join(FILES_DIR);
        fs::create_dir_all(&files_dir)
            .with_context(|| format!("failed to create {}", files_dir.display()))?;

        if let Some(support) = &self.support_dir {
            let hooks = copy_tree(&support.join(HOOKS_DIR), &hook_dir)?;
            let files = copy_tree(&support.join(FILES_DIR), &files_dir)?;
            debug!(charm = %self.key, hooks, files, "copied support files");
        }

        let entry_path = hook_dir.join(ENTRY_POINT);
        remove_existing(&entry_path)?;
        fs::write(&entry_path, &self.entry)
            .with_context(|| format!("failed to write {}", entry_path.display()))?;
        make_executable(&entry_path)?;

        for hook in &self.hooks {
            let link = hook_dir.join(hook);
            remove_existing(&link)?;
            symlink(Path::new(ENTRY_POINT), &link)
                .with_context(|| format!("failed to link {}", link.display()))?;
        }
        debug!(charm = %self.key, hooks = self.hooks.len(), "linked hooks");

        info!("Generated charm {} at {}", self.key, target_dir.display());
        Ok(())
    }
}

/// Check a support directory before anything is generated from it.
pub fn check_support_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("support directory {} does not exist", dir.display());
    }
    Ok(())
}

/// Copy every file under `src` into `dest`, keeping relative paths. A missing
/// `src` copies nothing. Returns the number of files copied.
fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        let target = dest.join(entry.path().strip_prefix(src)?);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
        } else {
            remove_existing(&target)?;
            fs::copy(entry.path(), &target).with_context(|| {
                format!("failed to copy {} to {}", entry.path().display(), target.display())
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove a file or link left by an earlier run so writes never follow it.
fn remove_existing(path: &Path) -> Result<()> {
    match path.symlink_metadata() {
        Ok(meta) if !meta.is_dir() => fs::remove_file(path)
            .with_context(|| format!("failed to replace {}", path.display())),
        _ => Ok(()),
    }
}

/// Resolve and write a single charm.
pub fn generate_charm(ctx: &ResolvedContext<'_>, id: &ServiceIdentifier, target_dir: &Path) -> Result<()> {
    CharmArtifacts::resolve(ctx, id)?.write(target_dir)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    // No mode bits to set; hook runners only exist on unix hosts.
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "hook links need symlink support",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use charmgen_core::CatalogConfig;
    use charmgen_resolve::select_from_catalog;

    fn catalog() -> CatalogConfig {
        CatalogConfig::parse(include_str!("../../../tests/fixtures/release1.toml")).unwrap()
    }

    #[test]
    fn test_generate_charm() {
        let catalog = catalog();
        let ctx = select_from_catalog(&catalog, 173u64).unwrap();
        let cc = &ctx.release().topology.services[0].id;
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");

        generate_charm(&ctx, cc, &build).unwrap();

        assert!(build.join("metadata.yaml").is_file());
        assert!(build.join("hooks").is_dir());
        let link = build.join("hooks").join("db-relation-changed");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("entry.py"));

        let entry = build.join("hooks").join("entry.py");
        assert!(entry.is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&entry).unwrap().permissions().mode();
            assert_eq!(mode & 0o555, 0o555);
        }
    }

    #[test]
    fn test_generate_charm_twice() {
        let catalog = catalog();
        let ctx = select_from_catalog(&catalog, 173u64).unwrap();
        let nats = &ctx.release().topology.services[1].id;
        let dir = tempfile::tempdir().unwrap();

        generate_charm(&ctx, nats, dir.path()).unwrap();
        generate_charm(&ctx, nats, dir.path()).unwrap();
        assert!(dir.path().join("hooks").join("nats-relation-joined").symlink_metadata().is_ok());
    }

    #[test]
    fn test_metadata_yaml_contents() {
        let catalog = catalog();
        let ctx = select_from_catalog(&catalog, 173u64).unwrap();
        let nats = &ctx.release().topology.services[1].id;
        let dir = tempfile::tempdir().unwrap();

        generate_charm(&ctx, nats, dir.path()).unwrap();

        let yaml = fs::read_to_string(dir.path().join("metadata.yaml")).unwrap();
        let meta: ServiceMetadata = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(meta.name, "nats-v1");
        assert_eq!(meta.provides.unwrap()["nats"].interface, "nats");
        assert!(meta.requires.contains_key("orchestrator"));
    }

    fn support_tree(root: &Path) {
        fs::create_dir_all(root.join("hooks/cloudfoundry")).unwrap();
        fs::create_dir_all(root.join("hooks/charmhelpers/core")).unwrap();
        fs::create_dir_all(root.join("files")).unwrap();
        fs::write(root.join("hooks/cloudfoundry/jobs.py"), "def job_manager(key): pass\n").unwrap();
        fs::write(root.join("hooks/charmhelpers/core/hookenv.py"), "").unwrap();
        fs::write(root.join("hooks/entry.py"), "stale").unwrap();
        fs::write(root.join("files/upstart.conf"), "start on runlevel [2345]\n").unwrap();
    }

    #[test]
    fn test_generate_charm_with_support_files() {
        let catalog = catalog();
        let ctx = select_from_catalog(&catalog, 173u64).unwrap();
        let cc = &ctx.release().topology.services[0].id;
        let dir = tempfile::tempdir().unwrap();
        let support = dir.path().join("support");
        support_tree(&support);
        let build = dir.path().join("build");

        let charm = CharmArtifacts::resolve(&ctx, cc).unwrap().with_support_dir(Some(support.as_path()));
        charm.write(&build).unwrap();
        // Regenerating over an existing tree must not write through hook links.
        charm.write(&build).unwrap();

        let hooks = build.join("hooks");
        assert!(hooks.join("cloudfoundry").is_dir());
        assert!(hooks.join("cloudfoundry/jobs.py").is_file());
        assert!(hooks.join("charmhelpers/core/hookenv.py").is_file());
        assert!(build.join("files/upstart.conf").is_file());
        let entry = fs::read_to_string(hooks.join("entry.py")).unwrap();
        assert!(entry.contains("job_manager(\"cloud_controller_v1\")"));
        assert!(hooks.join("install").symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_files_dir_created_without_support() {
        let catalog = catalog();
        let ctx = select_from_catalog(&catalog, 173u64).unwrap();
        let nats = &ctx.release().topology.services[1].id;
        let dir = tempfile::tempdir().unwrap();

        generate_charm(&ctx, nats, dir.path()).unwrap();
        assert!(dir.path().join("files").is_dir());
    }

    #[test]
    fn test_check_support_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_support_dir(dir.path()).is_ok());
        let err = check_support_dir(&dir.path().join("absent")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[cfg(not(any(unix, windows)))]
    #[test]
    fn test_symlink_unsupported() {
        let err = symlink(Path::new(ENTRY_POINT), Path::new("install")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_missing_service_writes_nothing() {
        let catalog = catalog();
        let ctx = select_from_catalog(&catalog, 173u64).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");

        let missing = ServiceIdentifier::pair("missing", "??");
        assert!(generate_charm(&ctx, &missing, &build).is_err());
        assert!(!build.exists());
    }
}
