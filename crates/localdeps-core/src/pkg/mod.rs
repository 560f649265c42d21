//! Local package resolution and installation.
//!
//! Provides:
//! - Parsing `package.json` manifests into package records
//! - Crawling repository roots for packages
//! - Caching the package index keyed on the repository list
//! - Resolving requested names into found/missing sets
//! - Copying or linking found packages into `node_modules`
//! - Handing missing packages to the external package manager

pub mod cache;
pub mod external;
pub mod install;
pub mod link;
pub mod manifest;
pub mod resolve;
pub mod scan;
pub mod session;

pub use cache::{fingerprint_repos, RepoCache};
pub use external::ExternalInstall;
pub use install::{install, InstallReport, PlacedPackage, INSTALL_REPORT_SCHEMA_VERSION};
pub use link::{place_package, Placement};
pub use manifest::{parse_manifest, read_manifest, PackageRecord};
pub use resolve::{resolve, PackageLookup, Resolution};
pub use scan::{scan, ScanOutput, ScanWarning};
pub use session::Installer;
