//! Package manifest parsing.
//!
//! Turns a `package.json` into a [`PackageRecord`]. Only the `name` and the
//! keys of `dependencies`/`devDependencies` matter to resolution; version
//! ranges are carried along for reporting but never interpreted.

use crate::paths::is_safe_package_name;
use indexmap::IndexMap;
use localdeps_util::fs::read_to_string_lossy;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A package discovered in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    /// Package name; the cache key.
    pub name: String,
    /// Directory containing the manifest.
    pub source_path: PathBuf,
    /// `dependencies` as name -> range, in manifest order.
    pub dependencies: IndexMap<String, String>,
    /// `devDependencies` as name -> range, in manifest order.
    pub dev_dependencies: IndexMap<String, String>,
}

impl PackageRecord {
    /// Names this package pulls in: `dependencies` first, then
    /// `devDependencies` unless `production` is set. Each name appears once.
    pub fn dependency_names(&self, production: bool) -> impl Iterator<Item = &str> {
        let dev = (!production).then_some(&self.dev_dependencies);
        self.dependencies.keys().map(String::as_str).chain(
            dev.into_iter()
                .flat_map(IndexMap::keys)
                .filter(move |name| !self.dependencies.contains_key(*name))
                .map(String::as_str),
        )
    }
}

/// Read and parse the manifest at `manifest_path`.
///
/// The record's `source_path` is the manifest's parent directory.
///
/// # Errors
/// Returns a human-readable reason if the file cannot be read, is not a JSON
/// object, or has no usable string `name`.
pub fn read_manifest(manifest_path: &Path) -> Result<PackageRecord, String> {
    let content =
        read_to_string_lossy(manifest_path).map_err(|e| format!("Failed to read: {e}"))?;
    let dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest(&content, dir)
}

/// Parse manifest text for a package living in `dir`.
///
/// # Errors
/// Returns a human-readable reason if the text is not a JSON object or has no
/// string `name` that can be installed under `node_modules`.
pub fn parse_manifest(content: &str, dir: &Path) -> Result<PackageRecord, String> {
    let pkg_json: Value = serde_json::from_str(content).map_err(|e| format!("Invalid JSON: {e}"))?;

    let root = pkg_json
        .as_object()
        .ok_or_else(|| "package.json must be a JSON object".to_string())?;

    let name = match root.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(other) => return Err(format!("'name' must be a non-empty string, got {other}")),
        None => return Err("missing 'name' field".to_string()),
    };

    if !is_safe_package_name(&name) {
        return Err(format!("'name' is not a valid package name: {name:?}"));
    }

    Ok(PackageRecord {
        dependencies: extract_section(root, "dependencies", &name),
        dev_dependencies: extract_section(root, "devDependencies", &name),
        source_path: dir.to_path_buf(),
        name,
    })
}

/// Extract one dependency section. A section that is not an object counts as empty.
fn extract_section(
    root: &serde_json::Map<String, Value>,
    section: &str,
    pkg_name: &str,
) -> IndexMap<String, String> {
    let Some(section_value) = root.get(section) else {
        return IndexMap::new();
    };

    let Some(section_obj) = section_value.as_object() else {
        debug!(package = pkg_name, section, "Ignoring non-object dependency section");
        return IndexMap::new();
    };

    section_obj
        .iter()
        .map(|(name, range)| {
            let range = match range {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), range)
        })
        .collect()
}
