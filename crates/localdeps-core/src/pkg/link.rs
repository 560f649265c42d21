//! Placing local packages into `node_modules`.
//!
//! A package is either linked to its source directory (symlink on Unix,
//! junction on Windows) or copied. Existing destinations are never touched.

use crate::error::Error;
use crate::paths::{install_path, is_safe_package_name};
use localdeps_util::fs::copy_dir_all;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How a package ended up in `node_modules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Copied,
    Linked,
    /// Destination already existed; nothing was written.
    Skipped,
}

/// Place the package `pkg_name` from `source` into `modules_dir`.
///
/// Returns the destination path and what was done. If anything already exists
/// at the destination (a directory, a file, or even a dangling link) the
/// package is skipped.
///
/// # Errors
/// - `INVALID_PARAMETER` if `pkg_name` would resolve outside `modules_dir`
/// - `FS_ERROR` if the scope directory, the link, or the copy fails
pub fn place_package(
    modules_dir: &Path,
    pkg_name: &str,
    source: &Path,
    symlink: bool,
) -> Result<(PathBuf, Placement), Error> {
    if !is_safe_package_name(pkg_name) {
        return Err(Error::invalid_parameter(format!(
            "refusing to install package with unsafe name {pkg_name:?}"
        )));
    }

    let dest = install_path(modules_dir, pkg_name);

    if dest.symlink_metadata().is_ok() {
        return Ok((dest, Placement::Skipped));
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::fs("Failed to create directory", parent, e))?;
    }

    if symlink {
        create_dir_link(source, &dest)?;
        Ok((dest, Placement::Linked))
    } else {
        copy_dir_all(source, &dest).map_err(|e| Error::fs("Failed to copy package to", &dest, e))?;
        Ok((dest, Placement::Copied))
    }
}

/// Create a directory link (symlink on Unix, junction on Windows).
fn create_dir_link(src: &Path, dst: &Path) -> Result<(), Error> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(src, dst)
            .map_err(|e| Error::fs("Failed to create symlink at", dst, e))?;
    }

    #[cfg(windows)]
    {
        junction::create(src, dst).map_err(|e| Error::fs("Failed to create junction at", dst, e))?;
    }

    #[cfg(not(any(unix, windows)))]
    {
        copy_dir_all(src, dst).map_err(|e| Error::fs("Failed to copy package to", dst, e))?;
    }

    Ok(())
}
