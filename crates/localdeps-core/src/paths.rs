use crate::config::InstallOptions;
use std::path::{Path, PathBuf};

/// Conventional manifest filename, matched case-insensitively while crawling.
pub const MANIFEST_NAME: &str = "package.json";

/// Default dependency directory name.
pub const DEFAULT_MODULES_DIR: &str = "node_modules";

/// Default external package manager.
pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";

/// Environment variable to override the package manager binary.
pub const PACKAGE_MANAGER_ENV: &str = "LOCALDEPS_NPM";

/// Whether a directory entry name is a package manifest.
#[must_use]
pub fn is_manifest_name(file_name: &str) -> bool {
    file_name.eq_ignore_ascii_case(MANIFEST_NAME)
}

/// The dependency directory for a run started in `cwd`.
#[must_use]
pub fn modules_dir(cwd: &Path, options: &InstallOptions) -> PathBuf {
    cwd.join(&options.modules_dir_name)
}

/// Whether `pkg_name` maps to a single directory inside the dependency directory.
///
/// Accepts `name` and `@scope/name`. Rejects absolute paths, `.`/`..`
/// segments, backslashes, drive separators and empty segments, any of which
/// would let [`install_path`] point outside `node_modules`.
#[must_use]
pub fn is_safe_package_name(pkg_name: &str) -> bool {
    if pkg_name.contains(['\\', ':', '\0']) {
        return false;
    }

    let segments: Vec<&str> = pkg_name.split('/').collect();
    let scoped = pkg_name.starts_with('@') && segments.len() == 2;

    (segments.len() == 1 || scoped)
        && segments
            .iter()
            .all(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
}

/// Where a package named `pkg_name` lives inside `modules_dir`.
///
/// Scoped names (`@scope/name`) nest under their scope directory.
#[must_use]
pub fn install_path(modules_dir: &Path, pkg_name: &str) -> PathBuf {
    if pkg_name.starts_with('@') {
        if let Some((scope, name)) = pkg_name.split_once('/') {
            return modules_dir.join(scope).join(name);
        }
    }
    modules_dir.join(pkg_name)
}
