//! Found/missing dependency resolution.
//!
//! Walks the dependency graph of the requested packages through the local
//! package index. Every name reachable from the request ends up in exactly one
//! of `found` (present locally) or `missing` (to be fetched from the registry).
//! Only dependency names drive the walk; version ranges are ignored.

use super::cache::RepoCache;
use super::manifest::PackageRecord;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Anything that can look packages up by name.
pub trait PackageLookup {
    /// Find the record for `name`, if one is indexed.
    fn lookup(&self, name: &str) -> Option<&Arc<PackageRecord>>;
}

impl PackageLookup for RepoCache {
    fn lookup(&self, name: &str) -> Option<&Arc<PackageRecord>> {
        self.get(name)
    }
}

impl PackageLookup for HashMap<String, Arc<PackageRecord>> {
    fn lookup(&self, name: &str) -> Option<&Arc<PackageRecord>> {
        self.get(name)
    }
}

/// Outcome of resolving a set of package names.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Packages found locally, in first-visit order, one per name.
    pub found: Vec<Arc<PackageRecord>>,
    /// Names not found locally, in first-visit order, deduplicated.
    pub missing: Vec<String>,
}

impl Resolution {
    /// Names of the found packages, in order.
    pub fn found_names(&self) -> impl Iterator<Item = &str> {
        self.found.iter().map(|r| r.name.as_str())
    }

    /// Whether nothing was requested (or reachable).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.found.is_empty() && self.missing.is_empty()
    }
}

/// Resolve `names` and their transitive dependencies against `index`.
///
/// `devDependencies` are followed unless `production` is set. A name is
/// descended into at most once, which keeps cyclic graphs finite and yields
/// the same first-occurrence order as a full walk followed by deduplication.
pub fn resolve<S, L>(names: &[S], index: &L, production: bool) -> Resolution
where
    S: AsRef<str>,
    L: PackageLookup + ?Sized,
{
    let mut walk = Walk {
        index,
        production,
        visited: HashSet::new(),
        out: Resolution::default(),
    };

    for name in names {
        walk.visit(name.as_ref());
    }

    walk.out
}

struct Walk<'a, L: ?Sized> {
    index: &'a L,
    production: bool,
    visited: HashSet<String>,
    out: Resolution,
}

impl<'a, L: PackageLookup + ?Sized> Walk<'a, L> {
    fn visit(&mut self, name: &str) {
        if !self.visited.insert(name.to_string()) {
            return;
        }

        let index = self.index;
        let Some(record) = index.lookup(name) else {
            // A missing package's own dependencies are unknowable.
            self.out.missing.push(name.to_string());
            return;
        };

        self.out.found.push(Arc::clone(record));
        for dep in record.dependency_names(self.production) {
            self.visit(dep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::path::PathBuf;

    fn record(name: &str, deps: &[&str], dev: &[&str]) -> PackageRecord {
        let map = |names: &[&str]| -> IndexMap<String, String> {
            names
                .iter()
                .map(|n| ((*n).to_string(), "^1.0.0".to_string()))
                .collect()
        };
        PackageRecord {
            name: name.to_string(),
            source_path: PathBuf::from(format!("/repo/{name}")),
            dependencies: map(deps),
            dev_dependencies: map(dev),
        }
    }

    fn index(records: Vec<PackageRecord>) -> HashMap<String, Arc<PackageRecord>> {
        records
            .into_iter()
            .map(|r| (r.name.clone(), Arc::new(r)))
            .collect()
    }

    fn found(res: &Resolution) -> Vec<&str> {
        res.found_names().collect()
    }

    #[test]
    fn test_local_chain_fully_found() {
        let idx = index(vec![record("alpha", &["beta"], &[]), record("beta", &[], &[])]);

        let res = resolve(&["alpha"], &idx, false);

        assert_eq!(found(&res), vec!["alpha", "beta"]);
        assert!(res.missing.is_empty());
    }

    #[test]
    fn test_empty_index_all_missing() {
        let idx = index(vec![]);
        let res = resolve(&["gamma"], &idx, false);
        assert!(res.found.is_empty());
        assert_eq!(res.missing, vec!["gamma"]);
    }

    #[test]
    fn test_missing_package_not_descended() {
        let idx = index(vec![record("app", &["remote"], &[])]);
        let res = resolve(&["app"], &idx, false);
        assert_eq!(found(&res), vec!["app"]);
        assert_eq!(res.missing, vec!["remote"]);
    }

    #[test]
    fn test_production_excludes_dev_only() {
        let idx = index(vec![
            record("app", &["lib"], &["jest", "devlocal"]),
            record("lib", &[], &[]),
            record("devlocal", &[], &[]),
        ]);

        let prod = resolve(&["app"], &idx, true);
        assert_eq!(found(&prod), vec!["app", "lib"]);
        assert!(prod.missing.is_empty());

        let dev = resolve(&["app"], &idx, false);
        assert_eq!(found(&dev), vec!["app", "lib", "devlocal"]);
        assert_eq!(dev.missing, vec!["jest"]);
    }

    #[test]
    fn test_production_applies_transitively() {
        let idx = index(vec![
            record("app", &["lib"], &[]),
            record("lib", &[], &["lib-test-helper"]),
        ]);
        let res = resolve(&["app"], &idx, true);
        assert_eq!(found(&res), vec!["app", "lib"]);
        assert!(res.missing.is_empty());
    }

    #[test]
    fn test_diamond_deduplicated_first_occurrence() {
        let idx = index(vec![
            record("top", &["left", "right"], &[]),
            record("left", &["shared", "ext"], &[]),
            record("right", &["shared", "ext"], &[]),
            record("shared", &[], &[]),
        ]);

        let res = resolve(&["top"], &idx, false);

        assert_eq!(found(&res), vec!["top", "left", "shared", "right"]);
        assert_eq!(res.missing, vec!["ext"]);
    }

    #[test]
    fn test_missing_keeps_manifest_order() {
        let idx = index(vec![record("app", &["zeta", "alpha"], &["mu"])]);
        let res = resolve(&["app"], &idx, false);
        assert_eq!(res.missing, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_requested_twice_and_transitively() {
        let idx = index(vec![record("a", &["b"], &[]), record("b", &[], &[])]);
        let res = resolve(&["b", "a", "b", "zzz", "zzz"], &idx, false);
        assert_eq!(found(&res), vec!["b", "a"]);
        assert_eq!(res.missing, vec!["zzz"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let idx = index(vec![
            record("a", &["b"], &[]),
            record("b", &["c"], &[]),
            record("c", &["a", "d"], &[]),
        ]);
        let res = resolve(&["a"], &idx, false);
        assert_eq!(found(&res), vec!["a", "b", "c"]);
        assert_eq!(res.missing, vec!["d"]);
    }

    #[test]
    fn test_self_dependency_terminates() {
        let idx = index(vec![record("narcissus", &["narcissus"], &[])]);
        let res = resolve(&["narcissus"], &idx, false);
        assert_eq!(found(&res), vec!["narcissus"]);
    }

    #[test]
    fn test_dev_cycle_only_without_production() {
        let idx = index(vec![record("a", &[], &["b"]), record("b", &[], &["a"])]);
        assert_eq!(found(&resolve(&["a"], &idx, false)), vec!["a", "b"]);
        assert_eq!(found(&resolve(&["a"], &idx, true)), vec!["a"]);
    }

    #[test]
    fn test_found_and_missing_partition_closure() {
        let idx = index(vec![
            record("root", &["x", "y"], &["z"]),
            record("x", &["y", "gone1"], &[]),
            record("y", &["root"], &["gone2"]),
        ]);

        for production in [false, true] {
            let res = resolve(&["root"], &idx, production);

            // Reference closure computed breadth-first.
            let mut reachable = HashSet::new();
            let mut queue = vec!["root".to_string()];
            while let Some(name) = queue.pop() {
                if !reachable.insert(name.clone()) {
                    continue;
                }
                if let Some(rec) = idx.get(&name) {
                    queue.extend(rec.dependency_names(production).map(String::from));
                }
            }

            let found: HashSet<String> = res.found_names().map(String::from).collect();
            let missing: HashSet<String> = res.missing.iter().cloned().collect();
            assert!(found.is_disjoint(&missing));
            assert_eq!(found.len(), res.found.len());
            assert_eq!(missing.len(), res.missing.len());
            let union: HashSet<String> = found.union(&missing).cloned().collect();
            assert_eq!(union, reachable, "production = {production}");
        }
    }
}
