//! Delegating missing packages to the external package manager.

use crate::error::Error;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// A single `<npm> install --no-save <pkgs...>` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalInstall {
    program: String,
    packages: Vec<String>,
    /// Project directory; the package manager installs into its `node_modules`.
    working_dir: PathBuf,
}

impl ExternalInstall {
    /// Build the invocation for `packages` using `program` (normally `npm`),
    /// to be run in `working_dir`.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        packages: &[String],
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            packages: packages.to_vec(),
            working_dir: working_dir.into(),
        }
    }

    /// Directory the command runs in.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        let mut args = vec!["install", "--no-save"];
        args.extend(self.packages.iter().map(String::as_str));
        args
    }

    /// The command as an operator would type it.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command with inherited stdio and wait for it.
    ///
    /// # Errors
    /// Returns `EXTERNAL_PROCESS_FAILED` if the program cannot be started or
    /// exits unsuccessfully.
    pub async fn run(&self) -> Result<(), Error> {
        info!(
            command = %self.command_line(),
            cwd = %self.working_dir.display(),
            "Attempting to install missing packages from npm"
        );

        let status = Command::new(&self.program)
            .args(self.args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::external(self.command_line(), format!("failed to start: {e}")))?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("exited with status {code}"),
                None => "was terminated by a signal".to_string(),
            };
            return Err(Error::external(self.command_line(), reason));
        }

        Ok(())
    }
}
