//! Install execution.
//!
//! Materializes a [`Resolution`] on disk: missing packages go to the external
//! package manager (unless local-only), found packages are copied or linked
//! into the dependency directory. Not transactional; a failure leaves any
//! packages placed before it in place.

use super::external::ExternalInstall;
use super::link::{place_package, Placement};
use super::resolve::Resolution;
use crate::config::InstallOptions;
use crate::error::Error;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Schema version for the JSON install report.
pub const INSTALL_REPORT_SCHEMA_VERSION: u32 = 1;

/// One found package and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedPackage {
    pub name: String,
    pub source: PathBuf,
    pub dest: PathBuf,
    pub placement: Placement,
}

/// What an install run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub schema_version: u32,
    pub modules_dir: PathBuf,
    /// Found packages, in resolution order.
    pub local: Vec<PlacedPackage>,
    /// Packages not found locally.
    pub missing: Vec<String>,
    /// Package manager command for `missing`, if any were missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_command: Option<String>,
    /// Whether `external_command` was actually run.
    pub external_ran: bool,
}

impl InstallReport {
    /// Number of packages written (copied or linked) by this run.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.local
            .iter()
            .filter(|p| p.placement != Placement::Skipped)
            .count()
    }
}

/// Install `resolution` into `modules_dir`.
///
/// Order: create `modules_dir`, hand missing packages to the package manager
/// (or only report the command when `local_only`), then place each found
/// package that is not already present. The package manager runs in the
/// parent of `modules_dir` so it installs into the same directory.
///
/// # Errors
/// - `FS_ERROR` if `modules_dir` cannot be created or a copy/link fails
/// - `EXTERNAL_PROCESS_FAILED` if the package manager fails; no local packages
///   are placed in that case
pub async fn install(
    resolution: &Resolution,
    options: &InstallOptions,
    modules_dir: &Path,
) -> Result<InstallReport, Error> {
    fs::create_dir_all(modules_dir)
        .map_err(|e| Error::fs("Failed to create dependency directory", modules_dir, e))?;

    let mut report = InstallReport {
        schema_version: INSTALL_REPORT_SCHEMA_VERSION,
        modules_dir: modules_dir.to_path_buf(),
        missing: resolution.missing.clone(),
        ..InstallReport::default()
    };

    if !resolution.missing.is_empty() {
        info!(
            count = resolution.missing.len(),
            "Packages not found in local repos: {}",
            resolution.missing.join(", ")
        );

        let project_dir = modules_dir.parent().unwrap_or(modules_dir);
        let external =
            ExternalInstall::new(&options.package_manager, &resolution.missing, project_dir);
        report.external_command = Some(external.command_line());

        if options.local_only {
            warn!(
                command = %external.command_line(),
                "You may need to install missing packages via npm"
            );
        } else {
            external.run().await?;
            report.external_ran = true;
            info!("Missing packages installed");
        }
    }

    for record in &resolution.found {
        let (dest, placement) =
            place_package(modules_dir, &record.name, &record.source_path, options.symlink)?;

        match placement {
            Placement::Skipped => {
                debug!(name = %record.name, dest = %dest.display(), "Already installed, skipping");
            }
            Placement::Copied | Placement::Linked => {
                info!(
                    name = %record.name,
                    from = %record.source_path.display(),
                    how = ?placement,
                    "Installed package"
                );
            }
        }

        report.local.push(PlacedPackage {
            name: record.name.clone(),
            source: record.source_path.clone(),
            dest,
            placement,
        });
    }

    Ok(report)
}
