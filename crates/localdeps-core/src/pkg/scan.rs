//! Repository crawling.
//!
//! Walks every repository root looking for `package.json` files and indexes
//! the packages it finds by name. Roots are crawled concurrently; inside one
//! root the walk is a sequential depth-first traversal with entries visited in
//! file-name order, so the result is deterministic for a given tree.

use super::manifest::{read_manifest, PackageRecord};
use crate::error::{codes, Error};
use crate::paths::is_manifest_name;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A recoverable problem found while crawling.
///
/// The offending entry is skipped and the crawl continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    /// Warning code (`PARSE_ERROR` or `DUPLICATE_PACKAGE`).
    pub code: &'static str,
    /// Manifest that triggered the warning.
    pub path: PathBuf,
    /// Package name, when the manifest got far enough to have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl ScanWarning {
    /// Create a parse error warning.
    #[must_use]
    pub fn parse_error(path: &Path, message: impl Into<String>) -> Self {
        Self {
            code: codes::PARSE_ERROR,
            path: path.to_path_buf(),
            name: None,
            message: message.into(),
        }
    }

    /// Create a duplicate package warning.
    #[must_use]
    pub fn duplicate(record: &PackageRecord, kept: &PackageRecord) -> Self {
        Self {
            code: codes::DUPLICATE_PACKAGE,
            path: record.source_path.clone(),
            name: Some(record.name.clone()),
            message: format!(
                "Package already exists in cache... skipping: {} (keeping {})",
                record.name,
                kept.source_path.display()
            ),
        }
    }
}

/// Everything one crawl produced.
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Packages by name; first discovered wins.
    pub packages: HashMap<String, Arc<PackageRecord>>,
    /// Skipped manifests and dropped duplicates, in discovery order.
    pub warnings: Vec<ScanWarning>,
    /// Directories listed across all roots.
    pub dirs_visited: usize,
}

/// Findings for a single root, before merging.
#[derive(Debug, Default)]
struct RootScan {
    records: Vec<PackageRecord>,
    warnings: Vec<ScanWarning>,
    dirs_visited: usize,
}

/// Crawl every root and index the packages found.
///
/// Records are merged in root order, so when two roots both contain a package
/// the one from the earlier root is kept.
///
/// # Errors
/// Fails if any directory in any root cannot be listed. No partial output is
/// returned in that case.
pub async fn scan(roots: &[PathBuf], verbose: bool) -> Result<ScanOutput, Error> {
    let per_root = try_join_all(roots.iter().map(|root| crawl_root(root, verbose))).await?;

    let mut output = ScanOutput::default();
    for root_scan in per_root {
        output.dirs_visited += root_scan.dirs_visited;
        output.warnings.extend(root_scan.warnings);

        for record in root_scan.records {
            if let Some(kept) = output.packages.get(&record.name) {
                output.warnings.push(ScanWarning::duplicate(&record, kept));
                continue;
            }
            if verbose {
                debug!(name = %record.name, path = %record.source_path.display(), "Added package to cache");
            }
            output
                .packages
                .insert(record.name.clone(), Arc::new(record));
        }
    }

    Ok(output)
}

async fn crawl_root(root: &Path, verbose: bool) -> Result<RootScan, Error> {
    let mut out = RootScan::default();
    crawl_dir(root, 0, verbose, &mut out).await?;
    Ok(out)
}

fn crawl_dir<'a>(
    dir: &'a Path,
    depth: usize,
    verbose: bool,
    out: &'a mut RootScan,
) -> BoxFuture<'a, Result<(), Error>> {
    async move {
        if verbose {
            debug!("{:indent$}{}", "", dir.display(), indent = depth * 2);
        }

        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::fs("Failed to read directory", dir, e))?;
        out.dirs_visited += 1;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| Error::fs("Failed to read directory", dir, e))?
        {
            entries.push(entry);
        }
        entries.sort_by_key(tokio::fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            // Does not follow symlinks: linked directories are not descended.
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::fs("Failed to stat", &path, e))?;

            if file_type.is_dir() {
                crawl_dir(&path, depth + 1, verbose, out).await?;
                continue;
            }

            if !is_manifest_name(&entry.file_name().to_string_lossy()) {
                continue;
            }

            match read_manifest(&path) {
                Ok(record) => out.records.push(record),
                Err(message) => out.warnings.push(ScanWarning::parse_error(&path, message)),
            }
        }

        Ok(())
    }
    .boxed()
}
