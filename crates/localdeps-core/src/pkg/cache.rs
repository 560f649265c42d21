//! Repository cache management.
//!
//! Owns the repository list and the package index built from it. The index is
//! rebuilt only when the fingerprint of the repository list changes. Manifest
//! edits inside an unchanged list of repositories are not noticed; call
//! [`RepoCache::invalidate`] to force a crawl.

use super::manifest::PackageRecord;
use super::scan::{scan, ScanWarning};
use crate::error::{codes, Error};
use localdeps_util::hash::blake3_concat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fingerprint of an ordered repository list.
///
/// Hash of the plain concatenation of the path strings, in order.
#[must_use]
pub fn fingerprint_repos(repos: &[PathBuf]) -> String {
    blake3_concat(repos.iter().map(|p| p.to_string_lossy().into_owned()))
}

/// Name-indexed cache of packages found in local repositories.
///
/// Single writer: every mutation takes `&mut self`, so a build can never be
/// observed half-done.
#[derive(Debug, Default)]
pub struct RepoCache {
    repos: Vec<PathBuf>,
    packages: HashMap<String, Arc<PackageRecord>>,
    /// Fingerprint of the repository list the current `packages` came from.
    fingerprint: Option<String>,
    warnings: Vec<ScanWarning>,
    verbose: bool,
    builds: usize,
}

impl RepoCache {
    /// Create an empty cache with no repositories.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Add a repository root.
    ///
    /// Paths already in the list are ignored. Returns whether the path was added.
    ///
    /// # Errors
    /// Returns `INVALID_PARAMETER` if `path` is not a directory.
    pub fn add_repo(&mut self, path: impl AsRef<Path>) -> Result<bool, Error> {
        let path = path.as_ref();
        let is_dir = std::fs::metadata(path).is_ok_and(|m| m.is_dir());
        if !is_dir {
            return Err(Error::invalid_parameter(format!(
                "repository is not a directory: {}",
                path.display()
            )));
        }

        let path = normalize_repo_path(path);
        if self.repos.contains(&path) {
            debug!(repo = %path.display(), "Repo already added");
            return Ok(false);
        }

        info!(repo = %path.display(), "Repo added");
        self.repos.push(path);
        Ok(true)
    }

    /// Repository roots, in the order they were added.
    #[must_use]
    pub fn repos(&self) -> &[PathBuf] {
        &self.repos
    }

    /// Make sure the index matches the current repository list.
    ///
    /// Returns `true` if a crawl ran, `false` if the existing index was reused.
    ///
    /// # Errors
    /// Propagates a directory-listing failure from the crawl. The cache is left
    /// empty and unfingerprinted, so the next call crawls again.
    pub async fn ensure_fresh(&mut self) -> Result<bool, Error> {
        let fingerprint = fingerprint_repos(&self.repos);
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            debug!(%fingerprint, "Cache is fresh");
            return Ok(false);
        }

        info!(%fingerprint, repos = self.repos.len(), "Building cache... (crawling repos for npm packages)");
        self.invalidate();

        let output = scan(&self.repos, self.verbose).await?;
        self.builds += 1;

        for warning in &output.warnings {
            // Duplicates are normal in big trees; only worth a warning on request.
            if warning.code == codes::DUPLICATE_PACKAGE && !self.verbose {
                debug!(path = %warning.path.display(), "{}", warning.message);
            } else {
                warn!(path = %warning.path.display(), code = warning.code, "{}", warning.message);
            }
        }

        self.packages = output.packages;
        self.warnings = output.warnings;
        self.fingerprint = Some(fingerprint);

        info!(
            packages = self.packages.len(),
            dirs = output.dirs_visited,
            "Cache built! Found {} packages",
            self.packages.len()
        );
        Ok(true)
    }

    /// Drop the index so the next [`ensure_fresh`](Self::ensure_fresh) crawls.
    pub fn invalidate(&mut self) {
        self.packages.clear();
        self.warnings.clear();
        self.fingerprint = None;
    }

    /// Look up a package by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<PackageRecord>> {
        self.packages.get(name)
    }

    /// The full name index.
    #[must_use]
    pub fn packages(&self) -> &HashMap<String, Arc<PackageRecord>> {
        &self.packages
    }

    /// Number of indexed packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no packages are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Warnings from the last successful build.
    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Fingerprint of the repository list the index was built from.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Number of crawls completed since creation.
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds
    }
}

/// Strip trailing separators so `repo/` and `repo` count as the same root.
fn normalize_repo_path(path: &Path) -> PathBuf {
    path.components().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_pkg(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"name": "{name}"}}"#),
        )
        .unwrap();
    }

    #[test]
    fn test_fingerprint_order_sensitive() {
        let a = PathBuf::from("/repos/a");
        let b = PathBuf::from("/repos/b");
        assert_eq!(
            fingerprint_repos(&[a.clone(), b.clone()]),
            fingerprint_repos(&[a.clone(), b.clone()])
        );
        assert_ne!(fingerprint_repos(&[a.clone(), b.clone()]), fingerprint_repos(&[b, a]));
    }

    #[test]
    fn test_add_repo_rejects_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir.txt");
        fs::write(&file, "x").unwrap();

        let mut cache = RepoCache::new(false);
        let err = cache.add_repo(&file).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_PARAMETER);
        assert!(cache.repos().is_empty());
    }

    #[test]
    fn test_add_repo_rejects_missing() {
        let dir = tempdir().unwrap();
        let mut cache = RepoCache::new(false);
        assert!(cache.add_repo(dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_add_repo_dedups() {
        let dir = tempdir().unwrap();
        let mut cache = RepoCache::new(false);

        assert!(cache.add_repo(dir.path()).unwrap());
        assert!(!cache.add_repo(dir.path()).unwrap());
        assert!(!cache.add_repo(dir.path().join("")).unwrap());
        assert_eq!(cache.repos().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_fresh_reuses_cache() {
        let repo = tempdir().unwrap();
        write_pkg(&repo.path().join("alpha"), "alpha");

        let mut cache = RepoCache::new(false);
        cache.add_repo(repo.path()).unwrap();

        assert!(cache.ensure_fresh().await.unwrap());
        assert_eq!(cache.builds(), 1);
        assert!(cache.get("alpha").is_some());

        assert!(!cache.ensure_fresh().await.unwrap());
        assert_eq!(cache.builds(), 1);
    }

    #[tokio::test]
    async fn test_manifest_edit_not_detected() {
        let repo = tempdir().unwrap();
        write_pkg(&repo.path().join("alpha"), "alpha");

        let mut cache = RepoCache::new(false);
        cache.add_repo(repo.path()).unwrap();
        cache.ensure_fresh().await.unwrap();

        write_pkg(&repo.path().join("beta"), "beta");
        assert!(!cache.ensure_fresh().await.unwrap());
        assert!(cache.get("beta").is_none());

        cache.invalidate();
        assert!(cache.ensure_fresh().await.unwrap());
        assert!(cache.get("beta").is_some());
    }

    #[tokio::test]
    async fn test_adding_repo_forces_rebuild() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        write_pkg(&first.path().join("alpha"), "alpha");
        write_pkg(&second.path().join("beta"), "beta");

        let mut cache = RepoCache::new(false);
        cache.add_repo(first.path()).unwrap();
        cache.ensure_fresh().await.unwrap();
        let before = cache.fingerprint().unwrap().to_string();

        cache.add_repo(second.path()).unwrap();
        assert!(cache.ensure_fresh().await.unwrap());
        assert_eq!(cache.builds(), 2);
        assert_ne!(cache.fingerprint().unwrap(), before);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_build_publishes_nothing() {
        let repo = tempdir().unwrap();
        let doomed = repo.path().join("doomed");
        write_pkg(&repo.path().join("alpha"), "alpha");
        fs::create_dir_all(&doomed).unwrap();

        let mut cache = RepoCache::new(false);
        cache.add_repo(repo.path()).unwrap();
        cache.add_repo(&doomed).unwrap();
        cache.ensure_fresh().await.unwrap();
        assert_eq!(cache.len(), 1);

        // Listing fails once the root is gone.
        fs::remove_dir_all(&doomed).unwrap();
        cache.invalidate();
        let err = cache.ensure_fresh().await.unwrap_err();
        assert_eq!(err.code(), codes::FS_ERROR);
        assert!(cache.is_empty());
        assert!(cache.fingerprint().is_none());

        // Recreating the root lets the next call rebuild.
        fs::create_dir_all(&doomed).unwrap();
        assert!(cache.ensure_fresh().await.unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_warning_kept() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        write_pkg(&first.path().join("shared"), "shared");
        write_pkg(&second.path().join("shared"), "shared");

        let mut cache = RepoCache::new(true);
        cache.add_repo(first.path()).unwrap();
        cache.add_repo(second.path()).unwrap();
        cache.ensure_fresh().await.unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("shared").unwrap().source_path, first.path().join("shared"));
        assert_eq!(cache.warnings().len(), 1);
        assert_eq!(cache.warnings()[0].code, codes::DUPLICATE_PACKAGE);
    }
}
