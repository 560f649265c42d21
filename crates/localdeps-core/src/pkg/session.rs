//! One resolve-and-install run.
//!
//! [`Installer`] owns the repository cache and the options for a run, turns
//! user arguments into package names, and drives cache → resolve → install.

use super::cache::RepoCache;
use super::install::{install, InstallReport};
use super::manifest::read_manifest;
use super::resolve::{resolve, Resolution};
use crate::config::InstallOptions;
use crate::error::Error;
use crate::paths::MANIFEST_NAME;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolves and installs packages from local repositories.
#[derive(Debug)]
pub struct Installer {
    options: InstallOptions,
    cache: RepoCache,
}

impl Installer {
    /// Create an installer with no repositories.
    #[must_use]
    pub fn new(options: InstallOptions) -> Self {
        Self {
            cache: RepoCache::new(options.verbose),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    #[must_use]
    pub fn cache(&self) -> &RepoCache {
        &self.cache
    }

    /// Mutable access to the cache, e.g. to [`RepoCache::invalidate`] it.
    pub fn cache_mut(&mut self) -> &mut RepoCache {
        &mut self.cache
    }

    /// Add a repository root to search.
    ///
    /// # Errors
    /// Returns `INVALID_PARAMETER` if `path` is not a directory.
    pub fn add_repo(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.cache.add_repo(path).map(|_| ())
    }

    /// Turn a command-line argument into a package name.
    ///
    /// An existing directory must hold a `package.json`; its `name` is returned
    /// and the directory becomes a repository, so the package installs from
    /// there. Anything that does not exist on disk is taken as a package name.
    ///
    /// # Errors
    /// Returns `INVALID_PARAMETER` for an existing path that is not a
    /// directory, or a directory without a readable, named manifest.
    pub fn resolve_target(&mut self, package_or_dir: &str) -> Result<String, Error> {
        info!(arg = package_or_dir, "Resolving packageName or directory");
        let path = Path::new(package_or_dir);

        let Ok(meta) = std::fs::metadata(path) else {
            info!(arg = package_or_dir, "Resolved as packageName");
            return Ok(package_or_dir.to_string());
        };

        if !meta.is_dir() {
            return Err(Error::invalid_parameter(format!(
                "not a directory: {package_or_dir}"
            )));
        }

        let manifest: PathBuf = path.join(MANIFEST_NAME);
        if !manifest.is_file() {
            return Err(Error::invalid_parameter(format!(
                "no {MANIFEST_NAME} in {package_or_dir}"
            )));
        }

        let record = read_manifest(&manifest)
            .map_err(|reason| Error::invalid_parameter(format!("{}: {reason}", manifest.display())))?;

        self.add_repo(path)?;
        info!(arg = package_or_dir, name = %record.name, "Resolved as directory");
        Ok(record.name)
    }

    /// Refresh the cache and resolve `names` against it.
    ///
    /// # Errors
    /// Propagates cache build failures.
    pub async fn resolve(&mut self, names: &[String]) -> Result<Resolution, Error> {
        self.cache.ensure_fresh().await?;
        Ok(resolve(names, &self.cache, self.options.production))
    }

    /// Resolve `names` and install the result under `cwd`.
    ///
    /// # Errors
    /// Propagates cache, filesystem and package manager failures.
    pub async fn install(&mut self, names: &[String], cwd: &Path) -> Result<InstallReport, Error> {
        let resolution = self.resolve(names).await?;
        info!(
            found = resolution.found.len(),
            missing = resolution.missing.len(),
            "Resolved dependencies"
        );

        let modules_dir = crate::paths::modules_dir(cwd, &self.options);
        install(&resolution, &self.options, &modules_dir).await
    }
}
