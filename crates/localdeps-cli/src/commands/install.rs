//! `localdeps` install command.
//!
//! Registers repositories, turns arguments into package names, then resolves
//! and installs them through [`Installer`]. Output is a human summary, or with
//! `--json` a single object on stdout.

use localdeps_core::pkg::{Placement, ScanWarning};
use localdeps_core::{Config, Error, InstallOptions, InstallReport, Installer};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct InstallOutput<'a> {
    ok: bool,
    install: &'a InstallReport,
    warnings: &'a [ScanWarning],
}

#[derive(Serialize)]
struct ErrorOutput {
    ok: bool,
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

/// Run an install for `targets` using `repos` as search roots.
///
/// Relative repositories and package directories are taken relative to
/// `config.cwd`.
pub fn run(
    config: &Config,
    options: InstallOptions,
    targets: &[String],
    repos: &[PathBuf],
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let mut installer = Installer::new(options);

    match runtime.block_on(execute(&mut installer, &config.cwd, targets, repos)) {
        Ok(report) => {
            if config.json_logs {
                let output = InstallOutput {
                    ok: true,
                    install: &report,
                    warnings: installer.cache().warnings(),
                };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                print_summary(&report);
            }
            info!("COMPLETE!");
            Ok(())
        }
        Err(err) => fail(&err, config.json_logs),
    }
}

async fn execute(
    installer: &mut Installer,
    cwd: &Path,
    targets: &[String],
    repos: &[PathBuf],
) -> Result<InstallReport, Error> {
    for repo in repos {
        installer.add_repo(cwd.join(repo))?;
    }

    let mut names = Vec::with_capacity(targets.len());
    for target in targets {
        names.push(installer.resolve_target(&target_arg(cwd, target))?);
    }

    installer.install(&names, cwd).await
}

/// Anchor a relative argument at `cwd` when that names something on disk.
///
/// Existence follows symlinks, matching [`Installer::resolve_target`]; anything
/// else, a dangling link included, passes through as a package name.
fn target_arg(cwd: &Path, target: &str) -> String {
    let path = Path::new(target);
    if path.is_absolute() {
        return target.to_string();
    }
    let joined = cwd.join(path);
    if std::fs::metadata(&joined).is_ok() {
        joined.to_string_lossy().into_owned()
    } else {
        target.to_string()
    }
}

fn print_summary(report: &InstallReport) {
    for pkg in &report.local {
        match pkg.placement {
            Placement::Copied => println!("+ {} (copied from {})", pkg.name, pkg.source.display()),
            Placement::Linked => println!("+ {} (linked to {})", pkg.name, pkg.source.display()),
            Placement::Skipped => println!("= {} (already in {})", pkg.name, report.modules_dir.display()),
        }
    }

    if !report.missing.is_empty() {
        println!("Not found locally: {}", report.missing.join(", "));
        if let Some(command) = &report.external_command {
            if report.external_ran {
                println!("Installed with: {command}");
            } else {
                println!("Install them with: {command}");
            }
        }
    }

    println!(
        "{} local package(s) placed, {} already present, {} missing",
        report.placed_count(),
        report.local.len() - report.placed_count(),
        report.missing.len()
    );
}

fn fail(err: &Error, json: bool) -> Result<()> {
    if json {
        let output = ErrorOutput {
            ok: false,
            error: ErrorInfo {
                code: err.code(),
                message: err.to_string(),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        eprintln!("error[{}]: {err}", err.code());
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_target_arg_relative_dir_anchored_at_cwd() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("my-lib")).unwrap();
        assert_eq!(
            target_arg(dir.path(), "my-lib"),
            dir.path().join("my-lib").to_string_lossy()
        );
    }

    #[test]
    fn test_target_arg_name_passed_through() {
        let dir = tempdir().unwrap();
        assert_eq!(target_arg(dir.path(), "left-pad"), "left-pad");
        assert_eq!(target_arg(dir.path(), "@types/node"), "@types/node");
    }

    #[cfg(unix)]
    #[test]
    fn test_target_arg_dangling_link_is_a_name() {
        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", dir.path().join("ghost")).unwrap();
        assert_eq!(target_arg(dir.path(), "ghost"), "ghost");
    }
}
